//! Hierarchy construction from flat host rows.
//!
//! Converts an ordered sequence of (nodeId, parentNodeId, payload) rows into
//! a forest of arena nodes. Nodes are created lazily the first time their id
//! is seen — as a row's own id or as an unresolved parent reference — so a
//! parent referenced before its own row becomes a placeholder whose payload
//! is filled in when (if) that row arrives.
//!
//! Building also reconciles the panel's open-node set: ids with no matching
//! row are pruned and the prune is reported so the caller can signal the
//! persistence collaborator exactly once.

use std::collections::{HashMap, HashSet};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;

use super::node::{NodeIdx, OrgNode};
use crate::error::ChartError;
use crate::state::OpenNodeSet;

/// One input row.
#[derive(Debug, Clone)]
pub struct Row<P> {
    /// Unique node id. The engine refuses empty ids but does not police
    /// duplicates; a duplicate id overwrites the payload and appends a
    /// second child edge, exactly as encountered.
    pub node_id: String,
    /// Parent node id; `None` marks a top-level row.
    pub parent_node_id: Option<String>,
    /// Trellis partition key; `None` lands in the default panel.
    pub trellis_by: Option<String>,
    /// Opaque payload handed back through scenes and selection.
    pub payload: P,
}

impl<P> Row<P> {
    /// Convenience constructor for an untrellised row.
    pub fn new(node_id: impl Into<String>, parent: Option<&str>, payload: P) -> Self {
        Self {
            node_id: node_id.into(),
            parent_node_id: parent.map(str::to_owned),
            trellis_by: None,
            payload,
        }
    }

    /// Attach a trellis partition key.
    pub fn with_trellis(mut self, trellis: impl Into<String>) -> Self {
        self.trellis_by = Some(trellis.into());
        self
    }
}

/// The built forest: an arena of nodes plus the top-level list.
///
/// Rendering currently draws only the first top-level node; additional roots
/// are built but left undrawn.
#[derive(Debug)]
pub struct Forest<P> {
    nodes: Vec<OrgNode<P>>,
    top_level: Vec<NodeIdx>,
    by_id: HashMap<String, NodeIdx>,
}

impl<P> Forest<P> {
    /// The node at an arena index.
    #[inline]
    pub fn node(&self, idx: NodeIdx) -> &OrgNode<P> {
        &self.nodes[idx.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: NodeIdx) -> &mut OrgNode<P> {
        &mut self.nodes[idx.index()]
    }

    /// Number of nodes in the arena, placeholders included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in row-encounter order.
    pub fn top_level(&self) -> &[NodeIdx] {
        &self.top_level
    }

    /// The node that gets rendered: the first top-level node, if any.
    pub fn root(&self) -> Option<NodeIdx> {
        self.top_level.first().copied()
    }

    /// Look up a node by its row-supplied id.
    pub fn find(&self, node_id: &str) -> Option<NodeIdx> {
        self.by_id.get(node_id).copied()
    }

    /// Iterate every node in the arena.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &OrgNode<P>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(at, node)| (NodeIdx::new(at as u32), node))
    }
}

/// Build a forest from rows, reconciling `open` against the row ids.
///
/// Returns the forest and whether stale open ids were pruned (the caller
/// owes the persistence collaborator a save when true). Fails fast on rows
/// with an empty node id and on cyclic parent references; on failure no
/// forest is produced, though reconciliation may already have pruned `open`.
pub fn build_forest<P>(
    rows: Vec<Row<P>>,
    open: &mut OpenNodeSet,
    collapse_enabled: bool,
) -> Result<(Forest<P>, bool), ChartError> {
    for (at, row) in rows.iter().enumerate() {
        if row.node_id.is_empty() {
            return Err(ChartError::MissingNodeId { row: at });
        }
    }

    // Prune open ids with no matching row before any flag is computed.
    let row_ids: HashSet<&str> = rows.iter().map(|row| row.node_id.as_str()).collect();
    let pruned = open.retain_known(&row_ids);

    let mut forest = Forest {
        nodes: Vec::new(),
        top_level: Vec::new(),
        by_id: HashMap::new(),
    };

    for row in rows {
        let idx = lookup_or_create(&mut forest, &row.node_id);

        // The payload and open flag are always refreshed, so a placeholder
        // created for a forward parent reference fills in here.
        let is_open = !collapse_enabled || open.contains(&row.node_id);
        let node = forest.node_mut(idx);
        node.set_payload(row.payload);
        node.set_open(is_open);

        match row.parent_node_id {
            None => forest.top_level.push(idx),
            Some(parent_id) => {
                let parent_idx = lookup_or_create(&mut forest, &parent_id);
                forest.node_mut(parent_idx).push_child(idx);
                forest.node_mut(idx).set_parent(parent_idx);
            }
        }
    }

    check_acyclic(&forest)?;

    Ok((forest, pruned))
}

fn lookup_or_create<P>(forest: &mut Forest<P>, node_id: &str) -> NodeIdx {
    if let Some(idx) = forest.by_id.get(node_id) {
        return *idx;
    }
    let idx = NodeIdx::new(forest.nodes.len() as u32);
    forest.nodes.push(OrgNode::new(node_id));
    forest.by_id.insert(node_id.to_owned(), idx);
    idx
}

/// Fail fast on cyclic parent references instead of recursing forever
/// during layout.
fn check_acyclic<P>(forest: &Forest<P>) -> Result<(), ChartError> {
    let edges = forest.iter().filter_map(|(idx, node)| {
        node.parent().map(|parent| (parent.raw(), idx.raw()))
    });
    let graph: DiGraph<(), ()> = DiGraph::from_edges(edges);
    if is_cyclic_directed(&graph) {
        return Err(ChartError::ParentCycle);
    }
    Ok(())
}
