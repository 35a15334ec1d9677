//! # Controllers
//!
//! The reply lifecycle state machine and the session loop driving it.

pub mod app_controller;
pub mod reply_controller;

pub use app_controller::AppController;
pub use reply_controller::{ReplyController, Rejection};
