//! Document capability
//!
//! Everything the tracker needs from its environment goes through
//! [`DocumentHost`]. Each environment (in-memory document, browser) provides
//! one implementation, chosen when the host is constructed.

use crate::tracker::error::TrackerResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Identifies one registered click listener on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A click as delivered by a host
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent<N> {
    /// Node the click was dispatched to
    pub target: N,
    /// X position relative to the whole document
    pub page_x: i32,
    /// Y position relative to the whole document
    pub page_y: i32,
    /// X position relative to the viewport
    pub client_x: i32,
    /// Y position relative to the viewport
    pub client_y: i32,
}

/// Listener invoked synchronously for every click on the document.
///
/// An error aborts the dispatch and is reported to whoever dispatched the event.
pub type ClickListener<N> = Rc<dyn Fn(&ClickEvent<N>) -> anyhow::Result<()>>;

/// Capability interface over a document and its click event registration
pub trait DocumentHost: Clone + 'static {
    /// Handle to a node in the document tree
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// The document node itself (root of the tree)
    fn document(&self) -> Self::Node;

    /// Parent of `node`, `None` for the document or a detached subtree root
    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Node name as reported by the host (case is not normalised)
    fn node_name(&self, node: &Self::Node) -> String;

    /// Raw `class` attribute value, if the node has one
    fn class_attribute(&self, node: &Self::Node) -> Option<String>;

    /// Current page location
    fn location_href(&self) -> TrackerResult<String>;

    /// Register a click listener on the document
    fn add_click_listener(&self, listener: ClickListener<Self::Node>) -> TrackerResult<ListenerId>;

    /// Remove a listener previously returned by [`add_click_listener`](Self::add_click_listener).
    ///
    /// Returns `false` if the listener was not registered; removing twice is not an error.
    fn remove_click_listener(&self, id: ListenerId) -> TrackerResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_ids_are_unique() {
        let a = ListenerId::new();
        let b = ListenerId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("listener-"));
    }
}
