//! # Reply Markup Bindings
//!
//! Locators for the elements of the storefront's reply markup contract,
//! plus the small visibility/disabled/form helpers the controller needs.
//! Every helper tolerates missing targets.

use super::{Document, NodeId, Selector};
use crate::replies::models::{FormData, ReplyId, ReviewId};
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const REVIEW_CARD: &str = "review-card";
pub const REVIEW_CONTENT: &str = "review-content";
pub const COMPOSE_CONTAINER: &str = "reply-form-container";
pub const COMPOSE_TRIGGER: &str = "show-reply-form-btn";
pub const COMPOSE_FORM: &str = "reply-form";
pub const CANCEL_COMPOSE: &str = "cancel-reply-btn";
pub const REPLY: &str = "review-reply";
pub const REPLY_CONTENT: &str = "reply-content";
pub const EDIT_TRIGGER: &str = "edit-reply-btn";
pub const EDIT_FORM: &str = "edit-reply-form";
pub const CANCEL_EDIT: &str = "cancel-edit-reply-btn";
pub const DELETE_TRIGGER: &str = "delete-reply-btn";

pub const REVIEW_ID_ATTR: &str = "data-review-id";
pub const REPLY_ID_ATTR: &str = "data-reply-id";
pub const ORIGINAL_CONTENT_ATTR: &str = "data-original-content";
pub const COMPOSE_TEMPLATE_ATTR: &str = "data-compose-template";

/// Name of the anti-forgery token field
pub const TOKEN_FIELD: &str = "csrfmiddlewaretoken";

/// Inline `display` values used to show and hide controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    InlineBlock,
}

impl Display {
    pub fn as_css(self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
            Display::InlineBlock => "inline-block",
        }
    }
}

fn for_review(class: &str, review_id: &ReviewId) -> Selector {
    Selector::class(class).with_attr_value(REVIEW_ID_ATTR, review_id.as_str())
}

fn for_reply(class: &str, reply_id: &ReplyId) -> Selector {
    Selector::class(class).with_attr_value(REPLY_ID_ATTR, reply_id.as_str())
}

fn first<D: Document + ?Sized>(document: &D, selector: &Selector) -> Option<NodeId> {
    document.query(document.root(), selector)
}

pub fn compose_trigger<D: Document + ?Sized>(document: &D, review_id: &ReviewId) -> Option<NodeId> {
    first(document, &for_review(COMPOSE_TRIGGER, review_id))
}

pub fn compose_form<D: Document + ?Sized>(document: &D, review_id: &ReviewId) -> Option<NodeId> {
    first(document, &for_review(COMPOSE_FORM, review_id))
}

pub fn reply_element<D: Document + ?Sized>(document: &D, reply_id: &ReplyId) -> Option<NodeId> {
    first(document, &for_reply(REPLY, reply_id))
}

pub fn edit_form<D: Document + ?Sized>(document: &D, reply_id: &ReplyId) -> Option<NodeId> {
    first(document, &for_reply(EDIT_FORM, reply_id))
}

pub fn delete_trigger<D: Document + ?Sized>(document: &D, reply_id: &ReplyId) -> Option<NodeId> {
    first(document, &for_reply(DELETE_TRIGGER, reply_id))
}

/// The card holding a review. Cards may carry the identifier themselves;
/// otherwise the card is found through the review's trigger or form.
pub fn review_card<D: Document + ?Sized>(document: &D, review_id: &ReviewId) -> Option<NodeId> {
    let card = Selector::class(REVIEW_CARD);
    first(document, &for_review(REVIEW_CARD, review_id))
        .or_else(|| {
            compose_trigger(document, review_id).and_then(|node| document.closest(node, &card))
        })
        .or_else(|| {
            compose_form(document, review_id).and_then(|node| document.closest(node, &card))
        })
}

pub fn card_of<D: Document + ?Sized>(document: &D, node: NodeId) -> Option<NodeId> {
    document.closest(node, &Selector::class(REVIEW_CARD))
}

pub fn content_area<D: Document + ?Sized>(document: &D, card: NodeId) -> Option<NodeId> {
    document.query(card, &Selector::class(REVIEW_CONTENT))
}

pub fn compose_container<D: Document + ?Sized>(document: &D, card: NodeId) -> Option<NodeId> {
    document.query(card, &Selector::class(COMPOSE_CONTAINER))
}

pub fn reply_content<D: Document + ?Sized>(document: &D, reply: NodeId) -> Option<NodeId> {
    document.query(reply, &Selector::class(REPLY_CONTENT))
}

pub fn submit_button<D: Document + ?Sized>(document: &D, form: NodeId) -> Option<NodeId> {
    document.query(form, &Selector::tag("button").with_attr_value("type", "submit"))
}

pub fn text_field<D: Document + ?Sized>(document: &D, form: NodeId) -> Option<NodeId> {
    document.query(form, &Selector::tag("textarea"))
}

/// Set the inline `display` of `node`, keeping its other declarations
pub fn set_display<D: Document + ?Sized>(document: &mut D, node: NodeId, display: Display) -> bool {
    if !document.contains(node) {
        return false;
    }
    let mut declarations: Vec<String> = document
        .attribute(node, "style")
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty() && !is_display_declaration(decl))
        .map(str::to_string)
        .collect();
    declarations.push(format!("display: {}", display.as_css()));
    document.set_attribute(node, "style", &declarations.join("; "))
}

fn is_display_declaration(declaration: &str) -> bool {
    declaration
        .split_once(':')
        .is_some_and(|(property, _)| property.trim().eq_ignore_ascii_case("display"))
}

fn hidden_inline<D: Document + ?Sized>(document: &D, node: NodeId) -> bool {
    if document.attribute(node, "hidden").is_some() {
        return true;
    }
    document.attribute(node, "style").is_some_and(|style| {
        style.split(';').any(|decl| {
            decl.split_once(':').is_some_and(|(property, value)| {
                property.trim().eq_ignore_ascii_case("display")
                    && value.trim().eq_ignore_ascii_case("none")
            })
        })
    })
}

/// Whether the node and all its ancestors are shown
pub fn is_displayed<D: Document + ?Sized>(document: &D, node: NodeId) -> bool {
    if !document.contains(node) {
        return false;
    }
    let mut current = Some(node);
    while let Some(candidate) = current {
        if hidden_inline(document, candidate) {
            return false;
        }
        current = document.parent(candidate);
    }
    true
}

pub fn set_disabled<D: Document + ?Sized>(document: &mut D, node: NodeId, disabled: bool) -> bool {
    if disabled {
        document.set_attribute(node, "disabled", "")
    } else {
        document.remove_attribute(node, "disabled")
    }
}

pub fn is_disabled<D: Document + ?Sized>(document: &D, node: NodeId) -> bool {
    document.attribute(node, "disabled").is_some()
}

/// Collect the successful controls of a form, in document order
pub fn form_data<D: Document + ?Sized>(document: &D, form: NodeId) -> FormData {
    let mut data = FormData::new();
    for control in document.query_all(form, &Selector::any().with_attr("name")) {
        let tag = document.tag_name(control).unwrap_or("");
        if !matches!(tag, "input" | "textarea") || is_disabled(document, control) {
            continue;
        }
        let kind = document
            .attribute(control, "type")
            .unwrap_or("text")
            .to_ascii_lowercase();
        if tag == "input" {
            match kind.as_str() {
                "submit" | "button" | "reset" | "image" | "file" => continue,
                "checkbox" | "radio" if document.attribute(control, "checked").is_none() => {
                    continue
                }
                _ => {}
            }
        }
        let (Some(name), Some(value)) = (document.attribute(control, "name"), document.value(control))
        else {
            continue;
        };
        data.append(name, value);
    }
    data
}

/// The anti-forgery token for a request: the submitted form's own field
/// first, then the page-wide field
pub fn anti_forgery_token<D: Document + ?Sized>(document: &D, form: Option<NodeId>) -> Option<String> {
    let field = Selector::any().with_attr_value("name", TOKEN_FIELD);
    form.and_then(|form| document.query(form, &field))
        .or_else(|| first(document, &field))
        .and_then(|node| document.value(node))
        .filter(|token| !token.is_empty())
}

/// Encode markup for storage in a `data-*` attribute
pub fn encode_markup(markup: &str) -> String {
    STANDARD.encode(markup)
}

/// Decode markup stored by [`encode_markup`]
pub fn decode_markup(encoded: &str) -> Option<String> {
    STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}
