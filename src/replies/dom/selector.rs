//! # Selectors
//!
//! Compound selectors of the form `tag.class.other[attr][attr=value]`.
//! This is the subset the reply markup contract needs: no combinators,
//! no pseudo-classes.

use super::{Document, NodeId};
use anyhow::{bail, Result};
use std::fmt;

/// Attribute condition inside a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub name: String,
    /// `None` matches on presence alone
    pub value: Option<String>,
}

/// A compound selector matched against a single element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// Matches any element
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(name: &str) -> Self {
        Self {
            tag: Some(name.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn class(name: &str) -> Self {
        Self::any().with_class(name)
    }

    pub fn with_class(mut self, name: &str) -> Self {
        self.classes.push(name.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str) -> Self {
        self.attributes.push(AttributeMatch {
            name: name.to_ascii_lowercase(),
            value: None,
        });
        self
    }

    pub fn with_attr_value(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttributeMatch {
            name: name.to_ascii_lowercase(),
            value: Some(value.to_string()),
        });
        self
    }

    /// Parse a compound selector such as `button[type=submit]` or
    /// `.review-reply[data-reply-id="7"]`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Empty selector");
        }

        let mut selector = Self::any();
        let mut rest = input;

        let tag_len = rest
            .find(|c: char| c == '.' || c == '[')
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if tag != "*" {
                if !is_identifier(tag) {
                    bail!("Invalid tag name '{tag}' in selector '{input}'");
                }
                selector.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_len..];
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after
                    .find(|c: char| c == '.' || c == '[')
                    .unwrap_or(after.len());
                let class = &after[..end];
                if !is_identifier(class) {
                    bail!("Invalid class name '{class}' in selector '{input}'");
                }
                selector.classes.push(class.to_string());
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let Some(end) = after.find(']') else {
                    bail!("Unterminated attribute condition in selector '{input}'");
                };
                let condition = &after[..end];
                let (name, value) = match condition.split_once('=') {
                    Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
                    None => (condition.trim(), None),
                };
                if !is_identifier(name) {
                    bail!("Invalid attribute name '{name}' in selector '{input}'");
                }
                selector.attributes.push(AttributeMatch {
                    name: name.to_ascii_lowercase(),
                    value: value.map(str::to_string),
                });
                rest = &after[end + 1..];
            } else {
                bail!("Unexpected '{rest}' in selector '{input}'");
            }
        }

        Ok(selector)
    }

    /// Check whether `node` is an element satisfying every condition
    pub fn matches<D: Document + ?Sized>(&self, document: &D, node: NodeId) -> bool {
        let Some(tag) = document.tag_name(node) else {
            return false;
        };

        if let Some(expected) = &self.tag {
            if expected != tag {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = document.attribute(node, "class").unwrap_or("");
            let mut present = class_attr.split_ascii_whitespace();
            if !self
                .classes
                .iter()
                .all(|class| present.clone().any(|c| c == class))
            {
                return false;
            }
        }

        self.attributes.iter().all(|condition| {
            match (document.attribute(node, &condition.name), &condition.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{tag}")?,
            None if self.classes.is_empty() && self.attributes.is_empty() => write!(f, "*")?,
            None => {}
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for condition in &self.attributes {
            match &condition.value {
                Some(value) => write!(f, "[{}=\"{}\"]", condition.name, value)?,
                None => write!(f, "[{}]", condition.name)?,
            }
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
