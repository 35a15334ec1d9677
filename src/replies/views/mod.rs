//! # Views
//!
//! User-facing output of the reply lifecycle.

pub mod notifier;

pub use notifier::{Notifier, RecordingNotifier, TerminalNotifier};
