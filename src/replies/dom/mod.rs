//! # Document Abstraction
//!
//! The reply controller never touches a concrete DOM. It works through the
//! [`Document`] trait, which covers exactly the element operations the reply
//! markup contract needs.
//!
//! ```text
//! Terminal:  ReplyController ──▶ PageDocument (parsed page file)
//! Testing:   ReplyController ──▶ PageDocument (inline fixture markup)
//! ```
//!
//! Every mutating operation reports whether its target still existed.
//! A vanished target is a no-op, never an error: elements disappear
//! legitimately while a request is in flight.

pub mod bindings;
pub mod markup;
pub mod page;
pub mod selector;

pub use page::PageDocument;
pub use selector::Selector;

/// Handle to a node in a [`Document`]. Handles of removed nodes go stale
/// and every operation on them is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Element-level document operations
pub trait Document: Send + Sync {
    /// The document root; not an element itself
    fn root(&self) -> NodeId;

    /// Whether the node is still attached to the document
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name, or `None` for non-elements and stale handles
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool;

    /// Descendants of `scope` (excluding `scope`) matching the selector,
    /// in document order
    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    fn inner_markup(&self, node: NodeId) -> Option<String>;

    fn outer_markup(&self, node: NodeId) -> Option<String>;

    /// Replace the children of `node` with parsed `markup`
    fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> bool;

    /// Replace `node` itself with parsed `markup`
    fn replace_with_markup(&mut self, node: NodeId, markup: &str) -> bool;

    /// Append parsed `markup` as the last children of `node`
    fn append_markup(&mut self, node: NodeId, markup: &str) -> bool;

    /// Detach `node` and its subtree
    fn remove(&mut self, node: NodeId) -> bool;

    /// Current value of a form control
    fn value(&self, node: NodeId) -> Option<String>;

    fn set_value(&mut self, node: NodeId, value: &str) -> bool;

    /// Return every control inside `form` to its default value
    fn reset_form(&mut self, form: NodeId) -> bool;

    fn focus(&mut self, node: NodeId) -> bool;

    fn focused(&self) -> Option<NodeId>;

    /// First descendant of `scope` matching the selector
    fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor of `node` matching the selector
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if selector.matches(self, candidate) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }
}
