//! # Reply Lifecycle Controller
//!
//! Decides, per user intent, which request to issue and how to reconcile
//! the response into the document. The document is the only state: every
//! operation re-locates its targets after each network round-trip and
//! skips whatever has disappeared in the meantime.
//!
//! ```text
//!             open_compose            submit_compose ✓
//!   Absent ───────────────▶ Composing ─────────────────▶ Displayed
//!     ▲   ◀─────────────────                              │   ▲
//!     │      cancel_compose                     open_edit │   │ cancel_edit
//!     │                                                   ▼   │ submit_edit ✓
//!     └──────────────── delete_reply ✓ ────────────────── Editing
//! ```
//!
//! Submitting controls are disabled while their request is outstanding
//! and restored once it settles, whatever the outcome.

use crate::replies::dom::bindings::{self, Display};
use crate::replies::dom::markup::{escape_attribute, escape_text};
use crate::replies::dom::{Document, NodeId, Selector};
use crate::replies::events::ReplyAction;
use crate::replies::models::{FormData, ReplyId, ReviewId};
use crate::replies::services::{
    ReplyEndpoint, ReplyEnvelope, ReplyRequest, ReplyTransport, TransportError,
};
use crate::replies::views::Notifier;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const POSTING_LABEL: &str =
    r#"<span class="spinner-border spinner-border-sm me-1"></span>Posting..."#;
pub const UPDATING_LABEL: &str =
    r#"<span class="spinner-border spinner-border-sm me-1"></span>Updating..."#;
pub const DELETING_LABEL: &str =
    r#"<span class="spinner-border spinner-border-sm me-1"></span>Deleting..."#;

pub const POST_ERROR: &str = "Error posting reply";
pub const UPDATE_ERROR: &str = "Error updating reply";
pub const DELETE_ERROR: &str = "Error deleting reply";
pub const DELETE_QUESTION: &str =
    "Are you sure you want to delete this reply? This action cannot be undone.";

/// Why an action did not go through. Application-level rejections and
/// transport failures both end up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: Option<String>,
}

impl Rejection {
    fn message_or(self, default: &str) -> String {
        self.message.unwrap_or_else(|| default.to_string())
    }
}

/// Fold a transport result into success or a single rejection
fn settle(
    result: Result<ReplyEnvelope, TransportError>,
    action: &str,
) -> Result<ReplyEnvelope, Rejection> {
    match result {
        Ok(envelope) if envelope.is_success() => Ok(envelope),
        Ok(envelope) => {
            tracing::warn!(
                "Server rejected {}: status={} message={:?}",
                action,
                envelope.status,
                envelope.message
            );
            Err(Rejection {
                message: envelope.message,
            })
        }
        Err(e) => {
            tracing::error!("Error during {}: {}", action, e);
            Err(Rejection { message: None })
        }
    }
}

/// A payload field the success envelope must carry
fn required(field: Option<String>, name: &str, action: &str) -> Result<String, Rejection> {
    field.ok_or_else(|| {
        tracing::error!("Malformed {} response: missing '{}'", action, name);
        Rejection { message: None }
    })
}

/// A disabled control waiting for its request to settle
struct PendingControl {
    button: NodeId,
    label: String,
}

impl PendingControl {
    /// Disable `button` and swap in the pending label. Returns `None` when
    /// the control is already waiting on a request.
    fn begin<D: Document + ?Sized>(
        document: &mut D,
        button: NodeId,
        pending_label: &str,
    ) -> Option<Self> {
        if bindings::is_disabled(document, button) {
            return None;
        }
        let label = document.inner_markup(button)?;
        bindings::set_disabled(document, button, true);
        document.set_inner_markup(button, pending_label);
        Some(Self { button, label })
    }

    /// Re-enable the control with its original label, if it still exists
    fn finish<D: Document + ?Sized>(self, document: &mut D) {
        if document.contains(self.button) {
            bindings::set_disabled(document, self.button, false);
            document.set_inner_markup(self.button, &self.label);
        }
    }
}

/// Outcome of claiming a form for submission
enum Claim {
    /// The form is gone or already submitting
    Skip,
    Claimed {
        pending: Option<PendingControl>,
        token: Option<String>,
    },
}

fn claim_form<D: Document + ?Sized>(
    document: &mut D,
    form: Option<NodeId>,
    form_data: &FormData,
    pending_label: &str,
) -> Claim {
    let Some(form) = form else {
        return Claim::Skip;
    };
    let pending = match bindings::submit_button(document, form) {
        Some(button) => match PendingControl::begin(document, button, pending_label) {
            Some(pending) => Some(pending),
            None => {
                tracing::debug!("Submit ignored: request already in flight");
                return Claim::Skip;
            }
        },
        None => None,
    };
    let token = form_data
        .get(bindings::TOKEN_FIELD)
        .map(str::to_string)
        .or_else(|| bindings::anti_forgery_token(document, Some(form)));
    Claim::Claimed { pending, token }
}

/// The reply lifecycle state machine
pub struct ReplyController<D: Document> {
    document: Arc<Mutex<D>>,
    transport: Arc<dyn ReplyTransport>,
    notifier: Arc<dyn Notifier>,
}

impl<D: Document> Clone for ReplyController<D> {
    fn clone(&self) -> Self {
        Self {
            document: Arc::clone(&self.document),
            transport: Arc::clone(&self.transport),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<D: Document + 'static> ReplyController<D> {
    pub fn new(document: D, transport: Arc<dyn ReplyTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
            transport,
            notifier,
        }
    }

    /// Shared handle to the document
    pub fn document(&self) -> Arc<Mutex<D>> {
        Arc::clone(&self.document)
    }

    /// Perform an action to completion. Deletion asks for confirmation first.
    pub async fn perform(&self, action: ReplyAction) {
        match action {
            ReplyAction::OpenCompose(review_id) => self.open_compose(&review_id).await,
            ReplyAction::CancelCompose(review_id) => self.cancel_compose(&review_id).await,
            ReplyAction::SubmitCompose {
                review_id,
                form_data,
            } => self.submit_compose(&review_id, form_data).await,
            ReplyAction::OpenEdit(reply_id) => self.open_edit(&reply_id).await,
            ReplyAction::CancelEdit {
                reply_id,
                captured_markup,
            } => self.cancel_edit(&reply_id, &captured_markup).await,
            ReplyAction::SubmitEdit {
                reply_id,
                form_data,
            } => self.submit_edit(&reply_id, form_data).await,
            ReplyAction::DeleteReply(reply_id) => self.delete_reply(&reply_id).await,
        }
    }

    /// Reveal the compose form of a review that has no reply yet
    pub async fn open_compose(&self, review_id: &ReviewId) {
        let mut document = self.document.lock().await;
        let document = &mut *document;

        let Some(form) = bindings::compose_form(document, review_id) else {
            tracing::debug!("No compose form for review {}", review_id);
            return;
        };
        let has_reply = bindings::review_card(document, review_id)
            .and_then(|card| document.query(card, &Selector::class(bindings::REPLY)))
            .is_some();
        if has_reply {
            tracing::debug!("Review {} already has a reply; compose not opened", review_id);
            return;
        }

        if let Some(trigger) = bindings::compose_trigger(document, review_id) {
            bindings::set_display(document, trigger, Display::None);
        }
        bindings::set_display(document, form, Display::Block);
        if let Some(field) = bindings::text_field(document, form) {
            document.focus(field);
        }
        tracing::debug!("Compose opened for review {}", review_id);
    }

    /// Close the compose form, discarding what was typed
    pub async fn cancel_compose(&self, review_id: &ReviewId) {
        let mut document = self.document.lock().await;
        let document = &mut *document;

        if let Some(form) = bindings::compose_form(document, review_id) {
            bindings::set_display(document, form, Display::None);
            document.reset_form(form);
        }
        if let Some(trigger) = bindings::compose_trigger(document, review_id) {
            bindings::set_display(document, trigger, Display::InlineBlock);
        }
    }

    /// Post a new reply and insert the server-rendered result
    pub async fn submit_compose(&self, review_id: &ReviewId, form_data: FormData) {
        let (pending, token) = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            let form = bindings::compose_form(document, review_id);
            match claim_form(document, form, &form_data, POSTING_LABEL) {
                Claim::Skip => return,
                Claim::Claimed { pending, token } => (pending, token),
            }
        };

        let request = ReplyRequest::new(ReplyEndpoint::Create(review_id.clone()))
            .with_form(form_data)
            .with_token(token);
        let result = self.transport.send(request).await;

        let outcome = settle(result, "reply creation").and_then(|envelope| {
            let html = required(envelope.reply_html, "reply_html", "reply creation")?;
            Ok((html, envelope.message))
        });

        let message = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            if let Some(pending) = pending {
                pending.finish(document);
            }
            match outcome {
                Ok((html, message)) => {
                    insert_reply(document, review_id, &html);
                    tracing::info!("Reply posted for review {}", review_id);
                    message
                }
                Err(rejection) => Some(rejection.message_or(POST_ERROR)),
            }
        };

        if let Some(message) = message {
            self.notifier.alert(&message);
        }
    }

    /// Fetch the reply text and swap the reply content for an edit form
    pub async fn open_edit(&self, reply_id: &ReplyId) {
        {
            let document = self.document.lock().await;
            if bindings::reply_element(&*document, reply_id).is_none() {
                tracing::debug!("No reply {} on the page", reply_id);
                return;
            }
            if bindings::edit_form(&*document, reply_id).is_some() {
                tracing::debug!("Reply {} is already being edited", reply_id);
                return;
            }
        }

        let request = ReplyRequest::new(ReplyEndpoint::FetchForEdit(reply_id.clone()));
        let result = self.transport.send(request).await;
        let text = match settle(result, "reply fetch")
            .and_then(|envelope| required(envelope.reply_text, "reply_text", "reply fetch"))
        {
            Ok(text) => text,
            Err(rejection) => {
                tracing::error!(
                    "Error loading reply data for {}: {}",
                    reply_id,
                    rejection.message_or("request failed")
                );
                return;
            }
        };

        let mut document = self.document.lock().await;
        let document = &mut *document;
        let Some(reply) = bindings::reply_element(document, reply_id) else {
            return;
        };
        if bindings::edit_form(document, reply_id).is_some() {
            return;
        }
        let Some(content) = bindings::reply_content(document, reply) else {
            tracing::debug!("Reply {} has no content region", reply_id);
            return;
        };
        let Some(captured) = document.inner_markup(content) else {
            return;
        };

        document.set_inner_markup(content, &edit_form_markup(reply_id, &text, &captured));
        if let Some(field) = bindings::edit_form(document, reply_id)
            .and_then(|form| bindings::text_field(document, form))
        {
            document.focus(field);
        }
        tracing::debug!("Editing reply {}", reply_id);
    }

    /// Put back the markup captured when editing started
    pub async fn cancel_edit(&self, reply_id: &ReplyId, captured_markup: &str) {
        let mut document = self.document.lock().await;
        let document = &mut *document;

        let Some(content) = bindings::reply_element(document, reply_id)
            .and_then(|reply| bindings::reply_content(document, reply))
        else {
            tracing::debug!("Reply {} vanished before cancel", reply_id);
            return;
        };
        document.set_inner_markup(content, captured_markup);
    }

    /// Save an edited reply and show the server-rendered result
    pub async fn submit_edit(&self, reply_id: &ReplyId, form_data: FormData) {
        let (pending, token) = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            let form = bindings::edit_form(document, reply_id);
            match claim_form(document, form, &form_data, UPDATING_LABEL) {
                Claim::Skip => return,
                Claim::Claimed { pending, token } => (pending, token),
            }
        };

        let request = ReplyRequest::new(ReplyEndpoint::Update(reply_id.clone()))
            .with_form(form_data)
            .with_token(token);
        let result = self.transport.send(request).await;

        let outcome = settle(result, "reply update").and_then(|envelope| {
            let html = required(envelope.reply_html, "reply_html", "reply update")?;
            Ok((html, envelope.message))
        });

        let message = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            if let Some(pending) = pending {
                pending.finish(document);
            }
            match outcome {
                Ok((html, message)) => {
                    if let Some(reply) = bindings::reply_element(document, reply_id) {
                        document.replace_with_markup(reply, &html);
                    }
                    tracing::info!("Reply {} updated", reply_id);
                    message
                }
                Err(rejection) => Some(rejection.message_or(UPDATE_ERROR)),
            }
        };

        if let Some(message) = message {
            self.notifier.alert(&message);
        }
    }

    /// Ask the user to confirm deleting a reply
    pub fn confirm_delete(&self, reply_id: &ReplyId) -> bool {
        let confirmed = self.notifier.confirm(DELETE_QUESTION);
        if !confirmed {
            tracing::debug!("Deletion of reply {} declined", reply_id);
        }
        confirmed
    }

    /// Confirm, then delete a reply
    pub async fn delete_reply(&self, reply_id: &ReplyId) {
        if self.confirm_delete(reply_id) {
            self.delete_confirmed(reply_id).await;
        }
    }

    /// Delete a reply the user has already confirmed
    pub async fn delete_confirmed(&self, reply_id: &ReplyId) {
        let (pending, token) = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            if bindings::reply_element(document, reply_id).is_none() {
                tracing::debug!("Reply {} already gone; nothing to delete", reply_id);
                return;
            }
            let pending = match bindings::delete_trigger(document, reply_id) {
                Some(button) => match PendingControl::begin(document, button, DELETING_LABEL) {
                    Some(pending) => Some(pending),
                    None => {
                        tracing::debug!("Delete of reply {} already in flight", reply_id);
                        return;
                    }
                },
                None => None,
            };
            (pending, bindings::anti_forgery_token(document, None))
        };

        let request =
            ReplyRequest::new(ReplyEndpoint::Delete(reply_id.clone())).with_token(token);
        let result = self.transport.send(request).await;
        let outcome = settle(result, "reply deletion");

        let message = {
            let mut document = self.document.lock().await;
            let document = &mut *document;
            if let Some(pending) = pending {
                pending.finish(document);
            }
            match outcome {
                Ok(envelope) => {
                    remove_reply(document, reply_id);
                    tracing::info!("Reply {} deleted", reply_id);
                    envelope.message
                }
                Err(rejection) => Some(rejection.message_or(DELETE_ERROR)),
            }
        };

        if let Some(message) = message {
            self.notifier.alert(&message);
        }
    }
}

/// Append the new reply to the review and retire the compose form, keeping
/// a pristine copy on its container for when the reply is deleted
fn insert_reply<D: Document + ?Sized>(document: &mut D, review_id: &ReviewId, html: &str) {
    let form = bindings::compose_form(document, review_id);
    let card = bindings::review_card(document, review_id)
        .or_else(|| form.and_then(|form| bindings::card_of(document, form)));

    match card.and_then(|card| bindings::content_area(document, card)) {
        Some(content) => {
            document.append_markup(content, html);
        }
        None => tracing::debug!("Review {} has no content area for the reply", review_id),
    }

    let Some(form) = form else {
        return;
    };
    let container = document.closest(form, &Selector::class(bindings::COMPOSE_CONTAINER));
    document.reset_form(form);
    bindings::set_display(document, form, Display::None);
    let template = document.outer_markup(form);
    document.remove(form);

    if let Some(container) = container {
        if let Some(template) = template {
            document.set_attribute(
                container,
                bindings::COMPOSE_TEMPLATE_ATTR,
                &bindings::encode_markup(&template),
            );
        }
        bindings::set_display(document, container, Display::None);
    }
}

/// Remove a reply and bring back the review's compose affordance
fn remove_reply<D: Document + ?Sized>(document: &mut D, reply_id: &ReplyId) {
    let Some(reply) = bindings::reply_element(document, reply_id) else {
        return;
    };
    let card = bindings::card_of(document, reply);
    document.remove(reply);

    let Some(card) = card else {
        return;
    };
    let Some(container) = bindings::compose_container(document, card) else {
        return;
    };

    let compose_form = Selector::class(bindings::COMPOSE_FORM);
    if document.query(container, &compose_form).is_none() {
        if let Some(template) = document
            .attribute(container, bindings::COMPOSE_TEMPLATE_ATTR)
            .and_then(bindings::decode_markup)
        {
            document.append_markup(container, &template);
        }
    }
    document.remove_attribute(container, bindings::COMPOSE_TEMPLATE_ATTR);

    if let Some(trigger) = document.query(card, &Selector::class(bindings::COMPOSE_TRIGGER)) {
        bindings::set_display(document, trigger, Display::InlineBlock);
    }
    bindings::set_display(document, container, Display::Block);
}

fn edit_form_markup(reply_id: &ReplyId, text: &str, captured: &str) -> String {
    format!(
        r#"<form class="edit-reply-form" data-reply-id="{id}">
    <textarea name="reply_text" class="form-control mb-2" rows="3" maxlength="1000" required>{text}</textarea>
    <div class="d-flex gap-2">
        <button type="submit" class="btn btn-primary btn-sm">Update Reply</button>
        <button type="button" class="btn btn-secondary btn-sm cancel-edit-reply-btn" data-original-content="{original}">Cancel</button>
    </div>
</form>"#,
        id = escape_attribute(reply_id.as_str()),
        text = escape_text(text),
        original = bindings::encode_markup(captured),
    )
}
