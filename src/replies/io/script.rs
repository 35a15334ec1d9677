//! # Scripted Input
//!
//! Pre-recorded command lines, from a script file or built in tests.

use super::CommandStream;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::Path;

pub struct ScriptCommandStream {
    lines: VecDeque<String>,
}

impl ScriptCommandStream {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a script, one command per line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script '{}'", path.display()))?;
        tracing::debug!("Loaded script '{}' ({} lines)", path.display(), content.lines().count());
        Ok(Self::new(content.lines()))
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl CommandStream for ScriptCommandStream {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
