//! In-memory document host
//!
//! A small arena document that implements [`DocumentHost`] without a browser.
//! Elements are created and attached explicitly, and [`MemoryDocument::click`]
//! dispatches a click synchronously to the registered listeners.

use crate::capture::traits::{ClickEvent, ClickListener, DocumentHost, ListenerId};
use crate::tracker::error::{TrackerError, TrackerResult};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

const DOCUMENT_NODE_NAME: &str = "#document";

static NEXT_DOCUMENT: AtomicUsize = AtomicUsize::new(0);

/// Handle to a node owned by a [`MemoryDocument`]
///
/// Handles carry the id of the document that created them, so a handle from
/// another document never resolves to a node here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    document: usize,
    index: usize,
}

#[derive(Debug)]
struct NodeData {
    name: String,
    class: Option<String>,
    parent: Option<NodeId>,
}

struct DomTree {
    id: usize,
    nodes: Vec<NodeData>,
    location: String,
    scroll_x: i32,
    scroll_y: i32,
    listeners: Vec<(ListenerId, ClickListener<NodeId>)>,
}

impl DomTree {
    fn node(&self, id: NodeId) -> Option<&NodeData> {
        if id.document != self.id {
            return None;
        }
        self.nodes.get(id.index)
    }

    fn node_mut(&mut self, id: NodeId) -> TrackerResult<&mut NodeData> {
        if id.document != self.id {
            return Err(TrackerError::UnknownNode(format!("{:?} belongs to another document", id)));
        }
        self.nodes
            .get_mut(id.index)
            .ok_or_else(|| TrackerError::UnknownNode(format!("{:?}", id)))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|data| data.parent);
        }
        false
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(registered, _)| *registered == id)
    }
}

/// Shared handle to an in-memory document; clones refer to the same tree.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Rc<RefCell<DomTree>>,
}

impl MemoryDocument {
    /// Create an empty document at the given location.
    pub fn new(location: impl Into<String>) -> Self {
        let root = NodeData {
            name: DOCUMENT_NODE_NAME.to_string(),
            class: None,
            parent: None,
        };

        Self {
            inner: Rc::new(RefCell::new(DomTree {
                id: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
                nodes: vec![root],
                location: location.into(),
                scroll_x: 0,
                scroll_y: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId {
            document: self.inner.borrow().id,
            index: 0,
        }
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str, class: Option<&str>) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        tree.nodes.push(NodeData {
            name: tag.to_string(),
            class: class.map(str::to_string),
            parent: None,
        });
        NodeId {
            document: tree.id,
            index: tree.nodes.len() - 1,
        }
    }

    /// Create an element and attach it under `parent`.
    pub fn append_element(
        &self,
        parent: &NodeId,
        tag: &str,
        class: Option<&str>,
    ) -> TrackerResult<NodeId> {
        let child = self.create_element(tag, class);
        self.append_child(parent, &child)?;
        Ok(child)
    }

    /// Move `child` (and its subtree) under `parent`.
    ///
    /// Fails if `parent` is `child` itself or one of its descendants, or if
    /// either node belongs to another document.
    pub fn append_child(&self, parent: &NodeId, child: &NodeId) -> TrackerResult<()> {
        let mut tree = self.inner.borrow_mut();
        if tree.node(*parent).is_none() {
            return Err(TrackerError::UnknownNode(format!("{:?}", parent)));
        }
        if tree.is_inclusive_ancestor(*child, *parent) {
            return Err(TrackerError::HierarchyRequest(format!(
                "{:?} cannot be appended under its own subtree",
                child
            )));
        }
        tree.node_mut(*child)?.parent = Some(*parent);
        Ok(())
    }

    /// Detach `node` from its parent.
    pub fn detach(&self, node: &NodeId) -> TrackerResult<()> {
        self.inner.borrow_mut().node_mut(*node)?.parent = None;
        Ok(())
    }

    /// Replace the class attribute of `node`.
    pub fn set_class(&self, node: &NodeId, class: Option<&str>) -> TrackerResult<()> {
        self.inner.borrow_mut().node_mut(*node)?.class = class.map(str::to_string);
        Ok(())
    }

    /// Navigate to a new location.
    pub fn set_location(&self, location: impl Into<String>) {
        self.inner.borrow_mut().location = location.into();
    }

    /// Set the viewport scroll offset used to derive client coordinates.
    pub fn set_scroll(&self, x: i32, y: i32) {
        let mut tree = self.inner.borrow_mut();
        tree.scroll_x = x;
        tree.scroll_y = y;
    }

    /// Number of click listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Click `target` at the given page coordinates.
    pub fn click(&self, target: &NodeId, page_x: i32, page_y: i32) -> anyhow::Result<()> {
        let (scroll_x, scroll_y) = {
            let tree = self.inner.borrow();
            (tree.scroll_x, tree.scroll_y)
        };

        self.dispatch(&ClickEvent {
            target: *target,
            page_x,
            page_y,
            client_x: page_x.saturating_sub(scroll_x),
            client_y: page_y.saturating_sub(scroll_y),
        })
    }

    /// Dispatch a click event to the listeners registered right now.
    ///
    /// A listener removed by an earlier listener during the same dispatch is
    /// skipped. The first error stops the dispatch and is returned.
    pub fn dispatch(&self, event: &ClickEvent<NodeId>) -> anyhow::Result<()> {
        let snapshot: Vec<(ListenerId, ClickListener<NodeId>)> =
            self.inner.borrow().listeners.clone();

        for (id, listener) in snapshot {
            if !self.inner.borrow().is_registered(id) {
                continue;
            }
            listener(event)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.inner.borrow();
        f.debug_struct("MemoryDocument")
            .field("location", &tree.location)
            .field("nodes", &tree.nodes.len())
            .field("listeners", &tree.listeners.len())
            .finish()
    }
}

// Unknown nodes read as parentless, so path derivation reports them detached.
impl DocumentHost for MemoryDocument {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.inner.borrow().node(*node).and_then(|data| data.parent)
    }

    fn node_name(&self, node: &NodeId) -> String {
        self.inner
            .borrow()
            .node(*node)
            .map(|data| data.name.clone())
            .unwrap_or_default()
    }

    fn class_attribute(&self, node: &NodeId) -> Option<String> {
        self.inner.borrow().node(*node).and_then(|data| data.class.clone())
    }

    fn location_href(&self) -> TrackerResult<String> {
        Ok(self.inner.borrow().location.clone())
    }

    fn add_click_listener(&self, listener: ClickListener<NodeId>) -> TrackerResult<ListenerId> {
        let id = ListenerId::new();
        self.inner.borrow_mut().listeners.push((id, listener));
        tracing::debug!("Added click listener {}", id);
        Ok(id)
    }

    fn remove_click_listener(&self, id: ListenerId) -> TrackerResult<bool> {
        let mut tree = self.inner.borrow_mut();
        let before = tree.listeners.len();
        tree.listeners.retain(|(registered, _)| *registered != id);
        let removed = tree.listeners.len() != before;
        if removed {
            tracing::debug!("Removed click listener {}", id);
        }
        Ok(removed)
    }
}
