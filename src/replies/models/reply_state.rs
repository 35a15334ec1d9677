//! # Review State
//!
//! Observed lifecycle state of a review's reply region. Always derived
//! from the document; nothing else records it.

use crate::replies::dom::{bindings, Document, Selector};
use crate::replies::models::ReviewId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// No reply, compose form closed
    Absent,
    /// Compose form open, no reply yet
    Composing,
    /// Reply shown read-only
    Displayed,
    /// Reply content replaced by an edit form
    Editing,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewState::Absent => "absent",
            ReviewState::Composing => "composing",
            ReviewState::Displayed => "displayed",
            ReviewState::Editing => "editing",
        };
        f.write_str(name)
    }
}

/// Read the state of a review, or `None` when its card is not on the page
pub fn review_state<D: Document + ?Sized>(document: &D, review_id: &ReviewId) -> Option<ReviewState> {
    let card = bindings::review_card(document, review_id)?;

    if let Some(reply) = document.query(card, &Selector::class(bindings::REPLY)) {
        let editing = document
            .query(reply, &Selector::class(bindings::EDIT_FORM))
            .is_some();
        return Some(if editing {
            ReviewState::Editing
        } else {
            ReviewState::Displayed
        });
    }

    let composing = bindings::compose_form(document, review_id)
        .is_some_and(|form| bindings::is_displayed(document, form));
    Some(if composing {
        ReviewState::Composing
    } else {
        ReviewState::Absent
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replies::dom::PageDocument;

    #[test]
    fn review_state_should_follow_the_markup() {
        let page = r#"<div class="review-card" data-review-id="1">
  <div class="reply-form-container"><form class="reply-form" data-review-id="1" style="display: none"></form></div>
</div>
<div class="review-card" data-review-id="2">
  <div class="reply-form-container"><form class="reply-form" data-review-id="2" style="display: block"></form></div>
</div>
<div class="review-card" data-review-id="3">
  <div class="review-reply" data-reply-id="9"><div class="reply-content">hi</div></div>
</div>
<div class="review-card" data-review-id="4">
  <div class="review-reply" data-reply-id="10"><div class="reply-content"><form class="edit-reply-form" data-reply-id="10"></form></div></div>
</div>"#;
        let document = PageDocument::parse(page);

        let state = |id: &str| review_state(&document, &ReviewId::new(id));
        assert_eq!(state("1"), Some(ReviewState::Absent));
        assert_eq!(state("2"), Some(ReviewState::Composing));
        assert_eq!(state("3"), Some(ReviewState::Displayed));
        assert_eq!(state("4"), Some(ReviewState::Editing));
        assert_eq!(state("5"), None);
    }
}
