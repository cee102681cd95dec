pub mod command;

pub use command::{Command, Response, Side, StateInfo, WindowInfo};
