//! # Notifier
//!
//! User dialogs: inline alerts for outcomes and the blocking confirmation
//! that guards deletion.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

pub trait Notifier: Send + Sync {
    /// Show an outcome message
    fn alert(&self, message: &str);

    /// Ask a yes/no question; `true` only on an explicit yes
    fn confirm(&self, question: &str) -> bool;
}

/// Notifier writing to the terminal and reading answers from stdin
pub struct TerminalNotifier {
    assume_yes: bool,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        println!("[alert] {message}");
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            println!("[confirm] {question} yes");
            return true;
        }

        print!("[confirm] {question} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Notifier recording every dialog, with a fixed confirmation answer
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
    answer: AtomicBool,
}

impl RecordingNotifier {
    pub fn new(answer: bool) -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
            answer: AtomicBool::new(answer),
        }
    }

    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn declining() -> Self {
        Self::new(false)
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn confirm(&self, question: &str) -> bool {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(question.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers_should_be_explicit() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("sure"));
    }

    #[test]
    fn recording_notifier_should_keep_dialogs() {
        let notifier = RecordingNotifier::declining();

        notifier.alert("Reply posted");
        assert!(!notifier.confirm("Delete?"));
        notifier.set_answer(true);
        assert!(notifier.confirm("Delete?"));

        assert_eq!(notifier.alerts(), ["Reply posted"]);
        assert_eq!(notifier.questions().len(), 2);
    }

    #[test]
    fn assume_yes_should_confirm_without_reading() {
        assert!(TerminalNotifier::new(true).confirm("Delete?"));
    }
}
