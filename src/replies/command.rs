//! # Session Commands
//!
//! One line of session input. Commands stand in for the user's hands:
//! clicks and submits become UI events, `type` edits a form control.
//!
//! ```text
//! click .show-reply-form-btn[data-review-id=42]
//! type .reply-form[data-review-id=42] Thanks for the kind words!
//! submit .reply-form[data-review-id=42]
//! wait
//! ```

use crate::replies::dom::Selector;
use crate::replies::models::ReviewId;
use anyhow::{bail, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Click the first element matching the selector
    Click(Selector),
    /// Submit the first form matching the selector
    Submit(Selector),
    /// Set the value of the first text control matching the selector, or of
    /// the first text control inside it
    Type { selector: Selector, text: String },
    /// Print the derived reply state of a review
    State(ReviewId),
    /// Print the current page markup
    Show,
    /// Block until every in-flight request has settled
    Wait,
    Quit,
}

impl SessionCommand {
    /// Parse a line of input. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "click" => SessionCommand::Click(selector_arg(name, rest)?),
            "submit" => SessionCommand::Submit(selector_arg(name, rest)?),
            "type" => {
                let Some((selector, text)) = rest.split_once(char::is_whitespace) else {
                    bail!("usage: type <selector> <text>");
                };
                SessionCommand::Type {
                    selector: Selector::parse(selector)?,
                    text: unescape_newlines(text.trim_start()),
                }
            }
            "state" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    bail!("usage: state <review-id>");
                }
                SessionCommand::State(ReviewId::new(rest))
            }
            "show" => no_args(name, rest, SessionCommand::Show)?,
            "wait" => no_args(name, rest, SessionCommand::Wait)?,
            "quit" | "exit" => no_args(name, rest, SessionCommand::Quit)?,
            other => bail!("unknown command '{other}'"),
        };

        Ok(Some(command))
    }
}

fn selector_arg(name: &str, rest: &str) -> Result<Selector> {
    if rest.is_empty() {
        bail!("usage: {name} <selector>");
    }
    Selector::parse(rest)
}

fn no_args(name: &str, rest: &str, command: SessionCommand) -> Result<SessionCommand> {
    if !rest.is_empty() {
        bail!("'{name}' takes no arguments");
    }
    Ok(command)
}

/// `\n` in typed text stands for a line break
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
