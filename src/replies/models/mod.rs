//! # Models
//!
//! Value types shared by the router, controller and transport.

pub mod form_data;
pub mod ids;
pub mod reply_state;

pub use form_data::FormData;
pub use ids::{ReplyId, ReviewId};
pub use reply_state::{review_state, ReviewState};
