//! # Command Input
//!
//! Where session commands come from. The session never reads stdin
//! directly, so tests and scripted runs feed it lines instead.
//!
//! ```text
//! Interactive:  AppController ──▶ StdinCommandStream  ──▶ stdin (prompted)
//! Scripted:     AppController ──▶ ScriptCommandStream ──▶ VecDeque<String>
//! ```

use anyhow::Result;

pub mod script;
pub mod terminal;

pub use script::ScriptCommandStream;
pub use terminal::StdinCommandStream;

/// Source of session command lines
pub trait CommandStream: Send {
    /// Next line without its terminator, or `None` at end of input
    fn next_line(&mut self) -> Result<Option<String>>;
}
