use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{Context, Result};

use obi_ipc::{Command, Response};

use super::CONTROL_ADDR;

pub struct IpcClient {
    stream: TcpStream,
}

impl IpcClient {
    pub fn connect() -> Result<Self> {
        let stream =
            TcpStream::connect(CONTROL_ADDR).context("Failed to connect to obi daemon")?;
        Ok(Self { stream })
    }

    pub fn send(&mut self, cmd: &Command) -> Result<Response> {
        let json = serde_json::to_string(cmd)?;
        writeln!(self.stream, "{}", json)?;
        self.stream.flush()?;

        let mut reader = BufReader::new(&self.stream);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let response: Response = serde_json::from_str(&line)?;
        Ok(response)
    }
}
