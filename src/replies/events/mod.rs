//! # Events
//!
//! Raw UI events and the reply actions they route to.

pub mod router;

pub use router::{Dispatch, EventRouter};

use crate::replies::dom::NodeId;
use crate::replies::models::{FormData, ReplyId, ReviewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Submit,
}

/// A raw UI event and the element it originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiEvent {
    pub kind: EventKind,
    pub target: NodeId,
}

impl UiEvent {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
        }
    }

    pub fn submit(target: NodeId) -> Self {
        Self {
            kind: EventKind::Submit,
            target,
        }
    }
}

/// One user intent against the reply lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAction {
    OpenCompose(ReviewId),
    CancelCompose(ReviewId),
    SubmitCompose {
        review_id: ReviewId,
        form_data: FormData,
    },
    OpenEdit(ReplyId),
    CancelEdit {
        reply_id: ReplyId,
        captured_markup: String,
    },
    SubmitEdit {
        reply_id: ReplyId,
        form_data: FormData,
    },
    DeleteReply(ReplyId),
}

impl ReplyAction {
    /// Whether performing the action involves a network round-trip
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ReplyAction::SubmitCompose { .. }
                | ReplyAction::OpenEdit(_)
                | ReplyAction::SubmitEdit { .. }
                | ReplyAction::DeleteReply(_)
        )
    }
}
