mod client;
mod server;

pub use client::IpcClient;
pub use server::IpcServer;

/// Control endpoint. Loopback TCP because the daemon targets a platform
/// without unix domain sockets; binding it also serves as the
/// single-instance lock.
pub const CONTROL_ADDR: &str = "127.0.0.1:47616";
