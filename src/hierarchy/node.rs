//! Hierarchy node entity and arena index.
//!
//! Nodes are the in-memory entities behind diagram rows. Each node has:
//! - The row-supplied string node id (unique within a panel)
//! - Parent and children stored as arena indices, never as owning references
//! - An optional payload (a parent referenced before its own row stays
//!   payload-less until that row arrives, possibly forever)
//! - An open flag controlling whether its children are rendered

use std::fmt;

/// Arena index of a node within a [`Forest`](super::Forest).
///
/// Indices are only meaningful against the forest that produced them; the
/// whole forest is discarded and rebuilt on every data update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    /// Create a new NodeIdx from a raw u32.
    #[inline]
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The index as a usize, for arena addressing.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeIdx {
    #[inline]
    fn from(idx: u32) -> Self {
        Self(idx)
    }
}

impl From<NodeIdx> for u32 {
    #[inline]
    fn from(idx: NodeIdx) -> Self {
        idx.0
    }
}

/// One hierarchy node.
///
/// The payload type `P` is opaque to the engine; the WASM boundary
/// instantiates it with host row indices, native callers use whatever their
/// rows carry.
#[derive(Debug, Clone)]
pub struct OrgNode<P> {
    node_id: String,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
    payload: Option<P>,
    is_open: bool,
}

impl<P> OrgNode<P> {
    /// Create a closed, payload-less node for the given id.
    pub(crate) fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            parent: None,
            children: Vec::new(),
            payload: None,
            is_open: false,
        }
    }

    /// The row-supplied node id.
    #[inline]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The parent's arena index, if this node is not top-level.
    #[inline]
    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    /// Children in row-encounter order.
    #[inline]
    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    /// The node's payload; `None` for placeholder nodes whose own row never
    /// appeared (they still render, without content).
    #[inline]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Whether the node has any structural children, open or not.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the node's children are currently rendered.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub(crate) fn set_payload(&mut self, payload: P) {
        self.payload = Some(payload);
    }

    pub(crate) fn set_parent(&mut self, parent: NodeIdx) {
        self.parent = Some(parent);
    }

    pub(crate) fn push_child(&mut self, child: NodeIdx) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_idx() {
        let idx = NodeIdx::new(42);
        assert_eq!(idx.raw(), 42);
        assert_eq!(idx.0, 42);
        assert_eq!(format!("{}", idx), "Node(42)");
    }

    #[test]
    fn test_node_idx_conversion() {
        let idx: NodeIdx = 123.into();
        let raw: u32 = idx.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_new_node_is_closed_and_empty() {
        let node: OrgNode<()> = OrgNode::new("ceo");
        assert_eq!(node.node_id(), "ceo");
        assert!(!node.is_open());
        assert!(!node.has_children());
        assert!(node.payload().is_none());
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_children_preserve_order() {
        let mut node: OrgNode<()> = OrgNode::new("ceo");
        node.push_child(NodeIdx::new(2));
        node.push_child(NodeIdx::new(1));
        assert!(node.has_children());
        assert_eq!(node.children(), &[NodeIdx::new(2), NodeIdx::new(1)]);
    }
}
