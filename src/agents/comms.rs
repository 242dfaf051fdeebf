//! The line protocol spoken with the level server: one
//! `Name1|Name2|...` line per joint action, answered by a positionally
//! aligned `true|false|...` line.

use crate::domain::{joint_action_to_string, JointAction};
use std::io::{BufRead, Write};
use tracing::debug;

/// A synchronous connection to the level server. Exactly one joint
/// action is ever in flight; every send waits for its acknowledgement.
#[derive(Debug)]
pub struct ServerConnection<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ServerConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Identifies the client to the server; must be sent before the
    /// level is read.
    pub fn send_name(&mut self, name: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{name}")?;
        self.writer.flush()
    }

    /// Reads the level text, up to and including the `#end` line.
    pub fn read_level_lines(&mut self) -> std::io::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with("#end");
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Sends one joint action and reads back the per-agent success
    /// acknowledgements.
    pub fn send_joint_action(&mut self, joint_action: &JointAction) -> std::io::Result<Vec<bool>> {
        let line = joint_action_to_string(joint_action);
        debug!(action = %line);
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        let response = self.read_line()?;
        Ok(parse_response(&response))
    }

    fn read_line(&mut self) -> std::io::Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(line.trim_end().to_string())
    }
}

fn parse_response(response: &str) -> Vec<bool> {
    response.split('|').map(|part| part == "true").collect()
}
