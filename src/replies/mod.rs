//! # Replies
//!
//! Seller replies to customer reviews, managed in place on a rendered page.
//!
//! ```text
//! io ──▶ command ──▶ controllers::AppController ──▶ events::EventRouter
//!                                │
//!                                ▼
//!                    controllers::ReplyController
//!                      │          │           │
//!                      ▼          ▼           ▼
//!                    dom      services      views
//!                 (Document) (ReplyTransport) (Notifier)
//! ```

pub mod command;
pub mod controllers;
pub mod dom;
pub mod events;
pub mod io;
pub mod models;
pub mod services;
pub mod views;

pub use command::SessionCommand;
pub use controllers::{AppController, ReplyController};
pub use dom::{Document, PageDocument, Selector};
pub use events::{EventRouter, ReplyAction, UiEvent};
pub use models::{FormData, ReplyId, ReviewId, ReviewState};
pub use services::{HttpTransport, MockTransport, ReplyTransport};
pub use views::{Notifier, RecordingNotifier, TerminalNotifier};
