//! # Delegated Event Router
//!
//! One capture point for every click and submit on the page. Events are
//! matched by their originating element against a fixed route table, so
//! forms inserted after page load are handled without re-binding.
//!
//! ```text
//! UiEvent ──▶ route table (first match) ──▶ ReplyAction ──▶ ReplyController
//! ```
//!
//! New actions are added by extending [`EventRouter::default_routes`].

use super::{EventKind, ReplyAction, UiEvent};
use crate::replies::dom::{bindings, Document, NodeId, Selector};
use crate::replies::models::{ReplyId, ReviewId};

/// Which controller operation a route resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    OpenCompose,
    CancelCompose,
    OpenEdit,
    CancelEdit,
    DeleteReply,
    SubmitCompose,
    SubmitEdit,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub kind: EventKind,
    pub selector: Selector,
    pub action: ActionKind,
}

/// Result of routing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub action: Option<ReplyAction>,
    /// The native behavior (navigation, form submission) must be suppressed
    pub prevent_default: bool,
}

impl Dispatch {
    fn ignored() -> Self {
        Self {
            action: None,
            prevent_default: false,
        }
    }
}

pub struct EventRouter {
    routes: Vec<Route>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            routes: Self::default_routes(),
        }
    }

    /// The storefront's reply routes
    pub fn default_routes() -> Vec<Route> {
        use ActionKind::*;
        use EventKind::*;

        [
            (Click, bindings::COMPOSE_TRIGGER, OpenCompose),
            (Click, bindings::CANCEL_COMPOSE, CancelCompose),
            (Click, bindings::EDIT_TRIGGER, OpenEdit),
            (Click, bindings::CANCEL_EDIT, CancelEdit),
            (Click, bindings::DELETE_TRIGGER, DeleteReply),
            (Submit, bindings::COMPOSE_FORM, SubmitCompose),
            (Submit, bindings::EDIT_FORM, SubmitEdit),
        ]
        .into_iter()
        .map(|(kind, class, action)| Route {
            kind,
            selector: Selector::class(class),
            action,
        })
        .collect()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route an event to the reply action it stands for
    pub fn dispatch<D: Document + ?Sized>(&self, document: &D, event: UiEvent) -> Dispatch {
        let Some(route) = self
            .routes
            .iter()
            .find(|route| route.kind == event.kind && route.selector.matches(document, event.target))
        else {
            return Dispatch::ignored();
        };

        let action = resolve(document, route.action, event.target);
        match &action {
            Some(action) => tracing::debug!("Routed {:?} on {} to {:?}", event.kind, route.selector, action),
            None => tracing::debug!(
                "Dropped {:?} on {}: identifiers could not be resolved",
                event.kind,
                route.selector
            ),
        }

        Dispatch {
            action,
            prevent_default: true,
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn review_id_of<D: Document + ?Sized>(document: &D, node: NodeId) -> Option<ReviewId> {
    document
        .attribute(node, bindings::REVIEW_ID_ATTR)
        .map(ReviewId::from)
}

fn reply_id_of<D: Document + ?Sized>(document: &D, node: NodeId) -> Option<ReplyId> {
    document
        .attribute(node, bindings::REPLY_ID_ATTR)
        .map(ReplyId::from)
}

fn resolve<D: Document + ?Sized>(
    document: &D,
    action: ActionKind,
    target: NodeId,
) -> Option<ReplyAction> {
    match action {
        ActionKind::OpenCompose => review_id_of(document, target).map(ReplyAction::OpenCompose),
        ActionKind::CancelCompose => document
            .closest(target, &Selector::class(bindings::COMPOSE_FORM))
            .and_then(|form| review_id_of(document, form))
            .map(ReplyAction::CancelCompose),
        ActionKind::OpenEdit => reply_id_of(document, target).map(ReplyAction::OpenEdit),
        ActionKind::CancelEdit => {
            let reply = document.closest(target, &Selector::class(bindings::REPLY))?;
            let reply_id = reply_id_of(document, reply)?;
            let captured_markup = document
                .attribute(target, bindings::ORIGINAL_CONTENT_ATTR)
                .and_then(bindings::decode_markup)?;
            Some(ReplyAction::CancelEdit {
                reply_id,
                captured_markup,
            })
        }
        ActionKind::DeleteReply => reply_id_of(document, target).map(ReplyAction::DeleteReply),
        ActionKind::SubmitCompose => Some(ReplyAction::SubmitCompose {
            review_id: review_id_of(document, target)?,
            form_data: bindings::form_data(document, target),
        }),
        ActionKind::SubmitEdit => Some(ReplyAction::SubmitEdit {
            reply_id: reply_id_of(document, target)?,
            form_data: bindings::form_data(document, target),
        }),
    }
}
