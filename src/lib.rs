//! # replyline - Seller Replies to Customer Reviews
//!
//! Create, edit and delete replies to product reviews in place on a rendered
//! storefront page, talking to the storefront's JSON reply endpoints.
//!
//! ## Architecture
//!
//! The page is the only state. A single delegated router maps UI events to
//! reply actions; the reply controller performs them against the page and
//! the network.
//!
//! ```text
//! ┌─────────────┐  commands  ┌───────────────┐  UiEvent  ┌─────────────┐
//! │CommandStream│───────────▶│ AppController │──────────▶│ EventRouter │
//! └─────────────┘            └───────────────┘           └──────┬──────┘
//!                                                               │ ReplyAction
//!                                                               ▼
//!  ┌──────────┐   alert/confirm   ┌─────────────────┐  request ┌───────────────┐
//!  │ Notifier │◀──────────────────│ ReplyController │─────────▶│ReplyTransport │
//!  └──────────┘                   └────────┬────────┘          └───────────────┘
//!                                          │ read/mutate
//!                                          ▼
//!                                   ┌─────────────┐
//!                                   │  Document   │
//!                                   └─────────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod replies;

// Re-export main types for easy access
pub use replies::*;
