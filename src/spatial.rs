//! Spatial index over rendered node boxes for rectangle marking.
//!
//! Every render pass rebuilds an R-tree of the visible nodes' bounding
//! boxes; drag-select queries then resolve in O(log n). Intersection is the
//! inclusive axis-aligned test (`a.left <= b.right && b.left <= a.right &&
//! a.top <= b.bottom && b.top <= a.bottom`), which is exactly what rstar's
//! envelope intersection computes, so boxes that merely touch the selection
//! edge still count.

use rstar::{RTree, RTreeObject, AABB};

use crate::hierarchy::NodeIdx;

/// A rendered node's bounding box in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    /// The node behind the box.
    pub node: NodeIdx,
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

impl NodeBox {
    /// Create a box from its center and size.
    pub fn from_center(node: NodeIdx, cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            node,
            min: [cx - width / 2.0, cy - height / 2.0],
            max: [cx + width / 2.0, cy + height / 2.0],
        }
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Spatial index for the visible nodes of one panel.
pub struct HitIndex {
    tree: RTree<NodeBox>,
}

impl HitIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Rebuild the index from this render's node boxes.
    ///
    /// Bulk loading beats incremental inserts for a full refresh, and a full
    /// refresh is the only mutation the render model needs.
    pub fn rebuild(&mut self, boxes: Vec<NodeBox>) {
        self.tree = RTree::bulk_load(boxes);
    }

    /// All nodes whose boxes intersect the selection rectangle.
    ///
    /// No ordering guarantee.
    pub fn in_rect(&self, left: f32, top: f32, right: f32, bottom: f32) -> Vec<NodeIdx> {
        let envelope = AABB::from_corners([left, top], [right, bottom]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|hit| hit.node)
            .collect()
    }

    /// Drop every box.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for HitIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_boxes() -> HitIndex {
        let mut index = HitIndex::new();
        index.rebuild(vec![
            NodeBox::from_center(NodeIdx::new(0), 0.0, 0.0, 150.0, 60.0),
            NodeBox::from_center(NodeIdx::new(1), 200.0, 0.0, 150.0, 60.0),
        ]);
        index
    }

    #[test]
    fn test_rect_covering_one_box_returns_only_it() {
        let index = two_boxes();
        // Exactly the first node's box.
        let hits = index.in_rect(-75.0, -30.0, 75.0, 30.0);
        assert_eq!(hits, vec![NodeIdx::new(0)]);
    }

    #[test]
    fn test_rect_spanning_both_returns_both() {
        let index = two_boxes();
        let mut hits = index.in_rect(-75.0, -30.0, 275.0, 30.0);
        hits.sort_by_key(|idx| idx.raw());
        assert_eq!(hits, vec![NodeIdx::new(0), NodeIdx::new(1)]);
    }

    #[test]
    fn test_touching_edge_counts_as_intersecting() {
        let index = two_boxes();
        // The selection's left edge lands exactly on node 1's right edge.
        let hits = index.in_rect(275.0, -5.0, 400.0, 5.0);
        assert_eq!(hits, vec![NodeIdx::new(1)]);
    }

    #[test]
    fn test_miss_returns_nothing() {
        let index = two_boxes();
        assert!(index.in_rect(500.0, 500.0, 600.0, 600.0).is_empty());
    }

    #[test]
    fn test_rebuild_replaces_previous_boxes() {
        let mut index = two_boxes();
        assert_eq!(index.len(), 2);

        index.rebuild(vec![NodeBox::from_center(
            NodeIdx::new(7),
            0.0,
            0.0,
            10.0,
            10.0,
        )]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.in_rect(-5.0, -5.0, 5.0, 5.0), vec![NodeIdx::new(7)]);
    }

    #[test]
    fn test_clear() {
        let mut index = two_boxes();
        index.clear();
        assert!(index.is_empty());
        assert!(index.in_rect(-1000.0, -1000.0, 1000.0, 1000.0).is_empty());
    }
}
