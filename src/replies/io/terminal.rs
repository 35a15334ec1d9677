//! # Terminal Input
//!
//! Reads commands from stdin, prompting only when a person is typing.

use super::CommandStream;
use anyhow::Result;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "replyline> ";

pub struct StdinCommandStream {
    interactive: bool,
}

impl StdinCommandStream {
    pub fn new() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stdin),
        }
    }
}

impl Default for StdinCommandStream {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStream for StdinCommandStream {
    fn next_line(&mut self) -> Result<Option<String>> {
        if self.interactive {
            let mut stdout = io::stdout();
            stdout.write_all(PROMPT.as_bytes())?;
            stdout.flush()?;
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
