//! # Page Document
//!
//! In-memory [`Document`] built from page markup. Nodes live in an arena
//! indexed by [`NodeId`]; removing a subtree clears its slots, so stale
//! handles held by in-flight actions fall through as no-ops.
//!
//! Slots are never reused, so a handle can never come to name a different
//! node. The arena grows with every markup swap for the life of the
//! document, which stays small for a single page session.
//!
//! Untouched start tags, explicit end tags and text keep their source
//! text, which makes `parse` followed by `markup` reproduce well-formed
//! input exactly.

use super::markup::{escape_attribute, is_void_element, tokenize, unescape, Token};
use super::{Document, NodeId, Selector};

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    /// Original start tag text; dropped once attributes change
    source: Option<String>,
    /// Original end tag text, when the input closed the element explicitly
    end_source: Option<String>,
    self_closing: bool,
    /// Live value of a form control, `None` while it holds its default
    value: Option<String>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Parsed page markup
#[derive(Debug, Clone)]
pub struct PageDocument {
    nodes: Vec<Option<Node>>,
    focused: Option<NodeId>,
}

impl PageDocument {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Root,
            })],
            focused: None,
        }
    }

    pub fn parse(markup: &str) -> Self {
        let mut document = Self::new();
        let children = document.build_fragment(markup);
        document.attach(Self::ROOT, children, None);
        document
    }

    /// Serialized markup of the whole page
    pub fn markup(&self) -> String {
        let mut out = String::new();
        self.write_children(Self::ROOT, &mut out);
        out
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Append a detached node; ids only ever grow
    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            parent: None,
            children: Vec::new(),
            data,
        }));
        id
    }

    /// Parse markup into detached nodes and return the top-level ones
    fn build_fragment(&mut self, markup: &str) -> Vec<NodeId> {
        let mut top_level = Vec::new();
        let mut open: Vec<(NodeId, String)> = Vec::new();

        for token in tokenize(markup) {
            let id = match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                    source,
                } => {
                    let keeps_open = !self_closing && !is_void_element(&name);
                    let id = self.alloc(NodeData::Element(Element {
                        tag: name.clone(),
                        attributes,
                        source: Some(source.to_string()),
                        end_source: None,
                        self_closing,
                        value: None,
                    }));
                    self.adopt(open.last().map(|(parent, _)| *parent), id, &mut top_level);
                    if keeps_open {
                        open.push((id, name));
                    }
                    continue;
                }
                Token::EndTag { name, source } => {
                    if let Some(depth) = open.iter().rposition(|(_, tag)| *tag == name) {
                        let closed = open[depth].0;
                        if let Some(element) = self.element_mut(closed) {
                            element.end_source = Some(source.to_string());
                        }
                        open.truncate(depth);
                    }
                    continue;
                }
                Token::Text(text) => self.alloc(NodeData::Text(text.to_string())),
                Token::Comment(text) => self.alloc(NodeData::Comment(text.to_string())),
            };
            self.adopt(open.last().map(|(parent, _)| *parent), id, &mut top_level);
        }

        top_level
    }

    fn adopt(&mut self, parent: Option<NodeId>, child: NodeId, top_level: &mut Vec<NodeId>) {
        match parent {
            Some(parent) => {
                if let Some(node) = self.node_mut(child) {
                    node.parent = Some(parent);
                }
                if let Some(node) = self.node_mut(parent) {
                    node.children.push(child);
                }
            }
            None => top_level.push(child),
        }
    }

    /// Attach detached nodes under `parent`, at `index` or at the end
    fn attach(&mut self, parent: NodeId, children: Vec<NodeId>, index: Option<usize>) {
        for &child in &children {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.node_mut(parent) {
            let at = index.unwrap_or(node.children.len()).min(node.children.len());
            node.children.splice(at..at, children);
        }
    }

    /// Clear the slots of a detached subtree
    fn drop_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                pending.extend(node.children);
            }
            if self.focused == Some(current) {
                self.focused = None;
            }
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = match self.node_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    /// Detach `id` from its parent, returning the parent and former index
    fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id)?.parent?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.remove(index);
        Some((parent, index))
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Root => self.write_children(id, out),
            NodeData::Text(text) | NodeData::Comment(text) => out.push_str(text),
            NodeData::Element(element) => {
                match &element.source {
                    Some(source) => out.push_str(source),
                    None => write_start_tag(element, out),
                }
                if element.self_closing || is_void_element(&element.tag) {
                    return;
                }
                self.write_children(id, out);
                match &element.end_source {
                    Some(source) => out.push_str(source),
                    None => {
                        out.push_str("</");
                        out.push_str(&element.tag);
                        out.push('>');
                    }
                }
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                self.write_node(child, out);
            }
        }
    }

    /// Decoded text of all descendant text nodes
    fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if let NodeData::Text(text) = &node.data {
                out.push_str(&unescape(text));
            }
            pending.extend(node.children.iter().rev());
        }
        out
    }

    fn default_value(&self, id: NodeId) -> Option<String> {
        let element = self.element(id)?;
        match element.tag.as_str() {
            "textarea" => {
                let text = self.text_content(id);
                // A newline directly after <textarea> is not part of the value
                let text = text
                    .strip_prefix("\r\n")
                    .or_else(|| text.strip_prefix('\n'))
                    .map(str::to_string)
                    .unwrap_or(text);
                Some(text)
            }
            "input" => Some(
                attribute_of(element, "value")
                    .unwrap_or_default()
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn attribute_of<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn write_start_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    if element.self_closing {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

impl Document for PageDocument {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn contains(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            match self.node(current) {
                None => return false,
                Some(n) => match n.parent {
                    Some(parent) => current = parent,
                    None => return current == Self::ROOT,
                },
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        attribute_of(self.element(node)?, &name.to_ascii_lowercase())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        let name = name.to_ascii_lowercase();
        match element.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) if existing == value => return true,
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attributes.push((name, value.to_string())),
        }
        element.source = None;
        true
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        let name = name.to_ascii_lowercase();
        let before = element.attributes.len();
        element.attributes.retain(|(key, _)| *key != name);
        if element.attributes.len() != before {
            element.source = None;
        }
        true
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        let Some(node) = self.node(scope) else {
            return found;
        };
        let mut pending: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            if selector.matches(self, current) {
                found.push(current);
            }
            if let Some(node) = self.node(current) {
                pending.extend(node.children.iter().rev());
            }
        }
        found
    }

    fn inner_markup(&self, node: NodeId) -> Option<String> {
        self.node(node)?;
        let mut out = String::new();
        self.write_children(node, &mut out);
        Some(out)
    }

    fn outer_markup(&self, node: NodeId) -> Option<String> {
        self.node(node)?;
        let mut out = String::new();
        self.write_node(node, &mut out);
        Some(out)
    }

    fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> bool {
        if self.element(node).is_none() && node != Self::ROOT {
            return false;
        }
        self.clear_children(node);
        let children = self.build_fragment(markup);
        self.attach(node, children, None);
        true
    }

    fn replace_with_markup(&mut self, node: NodeId, markup: &str) -> bool {
        let Some((parent, index)) = self.detach(node) else {
            return false;
        };
        self.drop_subtree(node);
        let replacement = self.build_fragment(markup);
        self.attach(parent, replacement, Some(index));
        true
    }

    fn append_markup(&mut self, node: NodeId, markup: &str) -> bool {
        if self.element(node).is_none() && node != Self::ROOT {
            return false;
        }
        let children = self.build_fragment(markup);
        self.attach(node, children, None);
        true
    }

    fn remove(&mut self, node: NodeId) -> bool {
        if self.detach(node).is_none() {
            return false;
        }
        self.drop_subtree(node);
        true
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        match &element.value {
            Some(value) => Some(value.clone()),
            None => self.default_value(node),
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> bool {
        match self.element_mut(node) {
            Some(element) if matches!(element.tag.as_str(), "input" | "textarea") => {
                element.value = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    fn reset_form(&mut self, form: NodeId) -> bool {
        if self.element(form).is_none() {
            return false;
        }
        for control in self.query_all(form, &Selector::any()) {
            if let Some(element) = self.element_mut(control) {
                element.value = None;
            }
        }
        true
    }

    fn focus(&mut self, node: NodeId) -> bool {
        if self.element(node).is_none() {
            return false;
        }
        self.focused = Some(node);
        true
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|&node| self.contains(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"<div class="review-card" data-review-id="42">
  <div class="review-content"><p>Great &amp; fast</p></div>
  <form class="reply-form" data-review-id="42">
    <textarea name="reply_text">
draft</textarea>
    <input type="hidden" name="csrfmiddlewaretoken" value="abc">
  </form>
</div>"#;

    fn find(document: &PageDocument, selector: &str) -> NodeId {
        document
            .query(document.root(), &Selector::parse(selector).unwrap())
            .unwrap_or_else(|| panic!("{selector} should exist"))
    }

    #[test]
    fn parse_then_markup_should_reproduce_source() {
        let document = PageDocument::parse(CARD);

        assert_eq!(document.markup(), CARD);
    }

    #[test]
    fn unclosed_elements_should_be_closed_at_end() {
        let document = PageDocument::parse("<div><p>open");

        assert_eq!(document.markup(), "<div><p>open</p></div>");
    }

    #[test]
    fn stray_end_tags_should_be_ignored() {
        let document = PageDocument::parse("<div>a</span>b</div>");

        assert_eq!(document.markup(), "<div>ab</div>");
    }

    #[test]
    fn non_ascii_text_should_parse_and_round_trip() {
        let page = r#"<div class="reply-content"><p>¡Gracias!</p></div>"#;
        let mut document = PageDocument::parse(page);
        assert_eq!(document.markup(), page);

        let content = find(&document, ".reply-content");
        assert!(document.append_markup(content, "感谢 <b>x</b>"));
        assert!(document.inner_markup(content).unwrap().ends_with("感谢 <b>x</b>"));
    }

    #[test]
    fn end_tags_should_keep_their_source() {
        let page = "<P>Hi</P><DIV class=a><em>x</Em ></DIV>";
        let document = PageDocument::parse(page);

        assert_eq!(document.markup(), page);
    }

    #[test]
    fn swapped_nodes_should_never_reuse_ids() {
        let mut document = PageDocument::parse("<div><p>first</p></div>");
        let container = find(&document, "div");
        let old = find(&document, "p");

        document.set_inner_markup(container, "<p>second</p>");
        let new = find(&document, "p");

        assert_ne!(old, new);
        assert!(!document.contains(old));
        assert!(!document.set_attribute(old, "class", "x"));
        assert_eq!(document.attribute(new, "class"), None);
    }

    #[test]
    fn attribute_names_should_be_case_insensitive() {
        let mut document = PageDocument::parse("<button>Go</button>");
        let button = find(&document, "button");

        assert!(document.set_attribute(button, "Disabled", ""));
        assert_eq!(document.attribute(button, "DISABLED"), Some(""));
        assert!(document.remove_attribute(button, "DISABLED"));

        assert_eq!(document.attribute(button, "disabled"), None);
        assert_eq!(document.markup(), "<button>Go</button>");
    }

    #[test]
    fn select_should_not_be_a_value_control() {
        let mut document =
            PageDocument::parse(r#"<select name="rating" value="5"><option selected>3</option></select>"#);
        let select = find(&document, "select");

        assert_eq!(document.value(select), None);
        assert!(!document.set_value(select, "4"));
    }

    #[test]
    fn set_attribute_should_rewrite_start_tag() {
        let mut document = PageDocument::parse(r#"<button   type=submit>Post</button>"#);
        let button = find(&document, "button");

        assert!(document.set_attribute(button, "disabled", ""));

        assert_eq!(
            document.markup(),
            r#"<button type="submit" disabled>Post</button>"#
        );
        assert!(document.remove_attribute(button, "disabled"));
        assert_eq!(document.attribute(button, "disabled"), None);
    }

    #[test]
    fn set_inner_markup_should_replace_children_and_stale_old_handles() {
        let mut document = PageDocument::parse(CARD);
        let content = find(&document, ".review-content");
        let paragraph = find(&document, "p");

        assert!(document.set_inner_markup(content, "<em>new</em>"));

        assert_eq!(document.inner_markup(content).as_deref(), Some("<em>new</em>"));
        assert!(!document.contains(paragraph));
        assert!(!document.set_attribute(paragraph, "class", "x"));
    }

    #[test]
    fn replace_with_markup_should_keep_sibling_position() {
        let mut document = PageDocument::parse("<ul><li>a</li><li id=b>b</li><li>c</li></ul>");
        let middle = find(&document, "li[id=b]");

        assert!(document.replace_with_markup(middle, "<li>B1</li><li>B2</li>"));

        assert_eq!(
            document.markup(),
            "<ul><li>a</li><li>B1</li><li>B2</li><li>c</li></ul>"
        );
        assert!(!document.replace_with_markup(middle, "<li>again</li>"));
    }

    #[test]
    fn append_markup_should_add_last_children() {
        let mut document = PageDocument::parse(CARD);
        let content = find(&document, ".review-content");

        assert!(document.append_markup(content, "<div id=r1>Thanks!</div>"));

        assert!(document
            .inner_markup(content)
            .unwrap()
            .ends_with("<div id=r1>Thanks!</div>"));
        let reply = find(&document, "div[id=r1]");
        assert_eq!(document.parent(reply), Some(content));
    }

    #[test]
    fn remove_should_detach_subtree() {
        let mut document = PageDocument::parse(CARD);
        let form = find(&document, ".reply-form");
        let textarea = find(&document, "textarea");

        assert!(document.remove(form));

        assert!(!document.contains(form));
        assert!(!document.contains(textarea));
        assert!(!document.remove(form));
        assert!(!document.markup().contains("reply-form"));
    }

    #[test]
    fn textarea_value_should_default_to_decoded_text() {
        let mut document = PageDocument::parse("<textarea>\nTom &amp; Jerry</textarea>");
        let textarea = find(&document, "textarea");

        assert_eq!(document.value(textarea).as_deref(), Some("Tom & Jerry"));
        assert!(document.set_value(textarea, "typed"));
        assert_eq!(document.value(textarea).as_deref(), Some("typed"));
        assert_eq!(
            document.markup(),
            "<textarea>\nTom &amp; Jerry</textarea>",
            "typing must not leak into markup"
        );
    }

    #[test]
    fn reset_form_should_restore_defaults() {
        let mut document = PageDocument::parse(CARD);
        let form = find(&document, ".reply-form");
        let textarea = find(&document, "textarea");
        let token = find(&document, "input");
        document.set_value(textarea, "changed");
        document.set_value(token, "tampered");

        assert!(document.reset_form(form));

        assert_eq!(document.value(textarea).as_deref(), Some("draft"));
        assert_eq!(document.value(token).as_deref(), Some("abc"));
    }

    #[test]
    fn set_value_should_only_apply_to_form_controls() {
        let mut document = PageDocument::parse(CARD);
        let paragraph = find(&document, "p");

        assert!(!document.set_value(paragraph, "x"));
        assert_eq!(document.value(paragraph), None);
    }

    #[test]
    fn focus_should_clear_when_element_is_removed() {
        let mut document = PageDocument::parse(CARD);
        let form = find(&document, ".reply-form");
        let textarea = find(&document, "textarea");

        assert!(document.focus(textarea));
        assert_eq!(document.focused(), Some(textarea));

        document.remove(form);
        assert_eq!(document.focused(), None);
    }

    #[test]
    fn closest_should_include_the_node_itself() {
        let document = PageDocument::parse(CARD);
        let textarea = find(&document, "textarea");
        let card = find(&document, ".review-card");

        assert_eq!(
            document.closest(textarea, &Selector::class("review-card")),
            Some(card)
        );
        assert_eq!(
            document.closest(card, &Selector::class("review-card")),
            Some(card)
        );
        assert_eq!(document.closest(textarea, &Selector::class("missing")), None);
    }

    #[test]
    fn query_all_should_follow_document_order() {
        let document = PageDocument::parse("<b id=1><b id=2></b></b><b id=3></b>");

        let ids: Vec<_> = document
            .query_all(document.root(), &Selector::tag("b"))
            .into_iter()
            .filter_map(|id| document.attribute(id, "id").map(str::to_string))
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }
}
