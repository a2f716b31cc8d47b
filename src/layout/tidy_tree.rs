//! Buchheim-Junger-Leipert tidy tree layout over the visible hierarchy.
//!
//! Implements the contour-based algorithm from "Improving Walker's Algorithm
//! to Run in Linear Time" (Buchheim, Junger, Leipert, 2002), producing
//! orientation-neutral coordinates for every visible node: the generation
//! axis is `depth * ancestor spacing`, the sibling axis keeps adjacent
//! subtree contours at least one sibling spacing apart.
//!
//! # Algorithm Overview
//!
//! 1. **Visible projection:** Walk the forest from the root, descending only
//!    through open nodes, into a flat walk arena.
//! 2. **First walk (bottom-up):** Assign preliminary sibling-axis
//!    coordinates by merging subtree contours, with threads for cheap
//!    contour traversal.
//! 3. **Second walk (top-down):** Apply accumulated modifiers to produce
//!    final coordinates.
//!
//! Unlike the textbook algorithm, a parent is not always centered over its
//! children: the alignment mode may pin it to its first or last child's
//! position instead. A single child coincides with its parent's coordinate
//! in every mode.

use crate::hierarchy::{Forest, NodeIdx};

/// How a parent's sibling-axis position relates to its children's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Pin the parent to its first child's position.
    FirstChild,
    /// Center the parent over the full children span.
    #[default]
    Center,
    /// Pin the parent to its last child's position.
    LastChild,
}

impl Alignment {
    /// Parse the host's configuration string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "first-child" => Some(Self::FirstChild),
            "center" => Some(Self::Center),
            "last-child" => Some(Self::LastChild),
            _ => None,
        }
    }
}

/// Spacing between node slots along the two layout axes.
///
/// Both values include the node box itself: sibling spacing is the box size
/// along the sibling axis plus the sibling padding, ancestor spacing is the
/// box size along the generation axis plus the ancestor padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSpacing {
    /// Minimum distance between adjacent sibling slots.
    pub sibling: f32,
    /// Distance between generations.
    pub ancestor: f32,
}

/// One laid-out visible node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    /// Arena index in the source forest.
    pub node: NodeIdx,
    /// Index of the parent within the placed sequence (`None` for the root).
    pub parent: Option<usize>,
    /// Depth below the root (root = 0).
    pub depth: u32,
    /// Sibling-axis coordinate.
    pub x: f32,
    /// Generation-axis coordinate.
    pub y: f32,
}

/// Internal node data used during the Buchheim walk.
struct WalkNode {
    /// Arena index in the source forest.
    node: NodeIdx,
    /// Depth in the visible tree (root = 0).
    depth: u32,
    /// Parent walk index (None for root).
    parent: Option<usize>,
    /// Children (in forest child order), as walk indices.
    children: Vec<usize>,
    /// Preliminary sibling-axis coordinate (from the first walk).
    prelim: f32,
    /// Modifier for subtree shift (accumulated in the first walk, applied in
    /// the second).
    modifier: f32,
    /// Left thread pointer (walk index).
    thread_left: Option<usize>,
    /// Right thread pointer (walk index).
    thread_right: Option<usize>,
    /// Ancestor pointer for the "default ancestor" in apportion.
    ancestor: usize,
    /// Shift value for even spacing of intermediate children.
    shift: f32,
    /// Change value for even spacing of intermediate children.
    change: f32,
    /// Left-to-right index among siblings.
    number: usize,
}

/// The tidy tree layout engine.
pub struct TidyTreeLayout {
    spacing: NodeSpacing,
    alignment: Alignment,
}

impl TidyTreeLayout {
    /// Create a layout engine with the given spacing and alignment.
    pub fn new(spacing: NodeSpacing, alignment: Alignment) -> Self {
        Self { spacing, alignment }
    }

    /// Lay out the subtree visible from `root`.
    ///
    /// Only nodes reachable by following children of open nodes take part; a
    /// closed root yields a single placed node. The result is in pre-order,
    /// so every node's parent index points at an earlier element.
    pub fn compute<P>(&self, forest: &Forest<P>, root: NodeIdx) -> Vec<PlacedNode> {
        let mut walk: Vec<WalkNode> = Vec::new();
        build_walk_tree(forest, root, None, 0, &mut walk);

        self.first_walk(0, &mut walk);

        let mut final_x = vec![0.0_f32; walk.len()];
        self.second_walk(0, 0.0, &walk, &mut final_x);

        walk.iter()
            .enumerate()
            .map(|(at, entry)| PlacedNode {
                node: entry.node,
                parent: entry.parent,
                depth: entry.depth,
                x: final_x[at],
                y: entry.depth as f32 * self.spacing.ancestor,
            })
            .collect()
    }

    /// First walk: bottom-up assignment of preliminary coordinates.
    fn first_walk(&self, v: usize, nodes: &mut Vec<WalkNode>) {
        // Clone children indices to avoid borrow conflict during recursion.
        let children: Vec<usize> = nodes[v].children.clone();

        if children.is_empty() {
            nodes[v].prelim = 0.0;
            return;
        }

        for &child in &children {
            self.first_walk(child, nodes);
        }

        let mut default_ancestor = children[0];

        // Position children and merge contours.
        for (i, &child) in children.iter().enumerate() {
            if i > 0 {
                let left_sibling = children[i - 1];
                // Shift child clear of its left sibling's subtree.
                let shift = self.separate(left_sibling, child, nodes);
                nodes[child].prelim += shift;
                nodes[child].modifier += shift;

                default_ancestor = self.apportion(child, left_sibling, default_ancestor, nodes);
            }
        }

        // Distribute extra space evenly among intermediate children.
        self.execute_shifts(v, nodes);

        // Place the parent against the children span per the alignment mode.
        // With a single child all three modes coincide, so the child ends up
        // directly in line with its parent.
        let first_child_prelim = nodes[children[0]].prelim;
        let last_child_prelim = nodes[children[children.len() - 1]].prelim;
        nodes[v].prelim = match self.alignment {
            Alignment::FirstChild => first_child_prelim,
            Alignment::Center => (first_child_prelim + last_child_prelim) / 2.0,
            Alignment::LastChild => last_child_prelim,
        };
    }

    /// Compute the minimum shift needed to keep `right`'s subtree clear of
    /// `left`'s, scanning both contours level by level.
    fn separate(&self, left: usize, right: usize, nodes: &Vec<WalkNode>) -> f32 {
        let mut left_contour = left;
        let mut right_contour = right;
        let mut left_mod = 0.0_f32;
        let mut right_mod = 0.0_f32;
        let mut max_shift = 0.0_f32;

        loop {
            let left_x = nodes[left_contour].prelim + left_mod;
            let right_x = nodes[right_contour].prelim + right_mod;

            let overlap = left_x + self.spacing.sibling - right_x;
            if overlap > max_shift {
                max_shift = overlap;
            }

            let next_left = self.next_right(left_contour, nodes);
            let next_right = self.next_left(right_contour, nodes);

            match (next_left, next_right) {
                (Some(nl), Some(nr)) => {
                    left_mod += nodes[left_contour].modifier;
                    right_mod += nodes[right_contour].modifier;
                    left_contour = nl;
                    right_contour = nr;
                }
                _ => break,
            }
        }

        max_shift
    }

    /// Next node on the right contour of a subtree.
    fn next_right(&self, v: usize, nodes: &[WalkNode]) -> Option<usize> {
        if let Some(&last_child) = nodes[v].children.last() {
            Some(last_child)
        } else {
            nodes[v].thread_right
        }
    }

    /// Next node on the left contour of a subtree.
    fn next_left(&self, v: usize, nodes: &[WalkNode]) -> Option<usize> {
        if let Some(&first_child) = nodes[v].children.first() {
            Some(first_child)
        } else {
            nodes[v].thread_left
        }
    }

    /// Apportion: resolve overlap between `v`'s subtree and the subtrees of
    /// its left siblings. The core of Buchheim's linear-time improvement.
    fn apportion(
        &self,
        v: usize,
        left_sibling: usize,
        mut default_ancestor: usize,
        nodes: &mut Vec<WalkNode>,
    ) -> usize {
        let mut v_inner_right = left_sibling;
        let mut v_outer_right = left_sibling;
        let mut v_inner_left = v;
        // Leftmost sibling via O(1) parent lookup.
        let mut v_outer_left = if let Some(parent_idx) = nodes[v].parent {
            nodes[parent_idx].children.first().copied().unwrap_or(v)
        } else {
            v
        };

        let mut s_inner_right = nodes[v_inner_right].modifier;
        let mut s_outer_right = nodes[v_outer_right].modifier;
        let mut s_inner_left = nodes[v_inner_left].modifier;
        let mut s_outer_left = nodes[v_outer_left].modifier;

        loop {
            let next_ir = self.next_right(v_inner_right, nodes);
            let next_il = self.next_left(v_inner_left, nodes);

            match (next_ir, next_il) {
                (Some(ir), Some(il)) => {
                    v_inner_right = ir;
                    v_inner_left = il;
                }
                _ => break,
            }

            if let Some(next) = self.next_left(v_outer_left, nodes) {
                v_outer_left = next;
            }
            if let Some(next) = self.next_right(v_outer_right, nodes) {
                v_outer_right = next;
            }

            nodes[v_outer_right].ancestor = v;

            let shift = (nodes[v_inner_right].prelim + s_inner_right)
                - (nodes[v_inner_left].prelim + s_inner_left)
                + self.spacing.sibling;

            if shift > 0.0 {
                let ancestor_v = nodes[v].ancestor;
                let move_ancestor = if self.is_ancestor_of(ancestor_v, v, nodes) {
                    ancestor_v
                } else {
                    default_ancestor
                };

                self.move_subtree(move_ancestor, v, shift, nodes);

                s_inner_left += shift;
                s_outer_left += shift;
            }

            s_inner_right += nodes[v_inner_right].modifier;
            s_inner_left += nodes[v_inner_left].modifier;
            s_outer_left += nodes[v_outer_left].modifier;
            s_outer_right += nodes[v_outer_right].modifier;
        }

        // Set threads where one contour outlasts the other.
        if self.next_right(v_inner_right, nodes).is_some()
            && self.next_right(v_outer_right, nodes).is_none()
        {
            let next = self.next_right(v_inner_right, nodes);
            nodes[v_outer_right].thread_right = next;
            nodes[v_outer_right].modifier += s_inner_right - s_outer_right;
        }

        if self.next_left(v_inner_left, nodes).is_some()
            && self.next_left(v_outer_left, nodes).is_none()
        {
            let next = self.next_left(v_inner_left, nodes);
            nodes[v_outer_left].thread_left = next;
            nodes[v_outer_left].modifier += s_inner_left - s_outer_left;
            default_ancestor = v;
        }

        default_ancestor
    }

    /// Check if `ancestor` can stand in for an ancestor of `v` within the
    /// current sibling group (depth-based simplification).
    fn is_ancestor_of(&self, ancestor: usize, v: usize, nodes: &[WalkNode]) -> bool {
        nodes[ancestor].depth <= nodes[v].depth
    }

    /// Shift node `wr` and record spacing adjustments between it and `wl`.
    fn move_subtree(&self, wl: usize, wr: usize, shift: f32, nodes: &mut Vec<WalkNode>) {
        let subtrees = (nodes[wr].number as f32 - nodes[wl].number as f32).max(1.0);
        let per_subtree = shift / subtrees;

        nodes[wr].change -= per_subtree;
        nodes[wr].shift += shift;
        nodes[wl].change += per_subtree;
        nodes[wr].prelim += shift;
        nodes[wr].modifier += shift;
    }

    /// Execute accumulated shifts for the children of node `v`.
    fn execute_shifts(&self, v: usize, nodes: &mut Vec<WalkNode>) {
        let children: Vec<usize> = nodes[v].children.clone();
        let mut shift = 0.0_f32;
        let mut change = 0.0_f32;

        for &child in children.iter().rev() {
            nodes[child].prelim += shift;
            nodes[child].modifier += shift;
            change += nodes[child].change;
            shift += nodes[child].shift + change;
        }
    }

    /// Second walk: apply accumulated modifiers top-down.
    fn second_walk(
        &self,
        v: usize,
        modifier_sum: f32,
        nodes: &[WalkNode],
        final_x: &mut Vec<f32>,
    ) {
        final_x[v] = nodes[v].prelim + modifier_sum;

        for &child in &nodes[v].children {
            self.second_walk(child, modifier_sum + nodes[v].modifier, nodes, final_x);
        }
    }
}

/// Project the visible tree into the walk arena, pre-order.
///
/// Children are descended only when their parent is open; the builder has
/// already rejected cyclic input, so the recursion terminates.
fn build_walk_tree<P>(
    forest: &Forest<P>,
    node: NodeIdx,
    parent: Option<usize>,
    depth: u32,
    out: &mut Vec<WalkNode>,
) {
    let walk_idx = out.len();
    out.push(WalkNode {
        node,
        depth,
        parent,
        children: Vec::new(),
        prelim: 0.0,
        modifier: 0.0,
        thread_left: None,
        thread_right: None,
        ancestor: walk_idx,
        shift: 0.0,
        change: 0.0,
        number: 0,
    });

    if forest.node(node).is_open() {
        let children: Vec<NodeIdx> = forest.node(node).children().to_vec();
        let mut child_walk_indices = Vec::with_capacity(children.len());

        for (number, child) in children.into_iter().enumerate() {
            let child_idx = out.len();
            build_walk_tree(forest, child, Some(walk_idx), depth + 1, out);
            out[child_idx].number = number;
            child_walk_indices.push(child_idx);
        }

        out[walk_idx].children = child_walk_indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{build_forest, Row};
    use crate::state::OpenNodeSet;

    const SPACING: NodeSpacing = NodeSpacing {
        sibling: 160.0,
        ancestor: 100.0,
    };

    fn forest_from(rows: Vec<Row<u32>>, open_ids: &[&str]) -> Forest<u32> {
        let mut open = OpenNodeSet::new();
        for id in open_ids {
            open.set_open(id, true);
        }
        let (forest, _) = build_forest(rows, &mut open, true).unwrap();
        forest
    }

    fn placed_x(placed: &[PlacedNode], forest: &Forest<u32>, id: &str) -> f32 {
        let idx = forest.find(id).unwrap();
        placed.iter().find(|p| p.node == idx).unwrap().x
    }

    #[test]
    fn test_two_children_symmetric_about_parent() {
        let forest = forest_from(
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("a"), 2),
            ],
            &["a"],
        );
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);
        let placed = layout.compute(&forest, forest.root().unwrap());

        assert_eq!(placed.len(), 3);

        let a_x = placed_x(&placed, &forest, "a");
        let b_x = placed_x(&placed, &forest, "b");
        let c_x = placed_x(&placed, &forest, "c");

        assert!(((b_x + c_x) / 2.0 - a_x).abs() < 0.01, "parent centered");
        assert!(
            (c_x - b_x - SPACING.sibling).abs() < 0.01,
            "siblings one slot apart: b={b_x}, c={c_x}"
        );

        // Generation axis is depth-based.
        assert_eq!(placed[0].y, 0.0);
        assert!(placed[1..].iter().all(|p| p.y == SPACING.ancestor));
    }

    #[test]
    fn test_alignment_pins_parent_to_first_or_last_child() {
        let rows = || {
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("a"), 2),
                Row::new("d", Some("a"), 3),
            ]
        };
        let forest = forest_from(rows(), &["a"]);

        let first =
            TidyTreeLayout::new(SPACING, Alignment::FirstChild).compute(&forest, forest.root().unwrap());
        assert_eq!(
            placed_x(&first, &forest, "a"),
            placed_x(&first, &forest, "b")
        );

        let last =
            TidyTreeLayout::new(SPACING, Alignment::LastChild).compute(&forest, forest.root().unwrap());
        assert_eq!(placed_x(&last, &forest, "a"), placed_x(&last, &forest, "d"));
    }

    #[test]
    fn test_single_child_in_line_with_parent_in_every_mode() {
        for alignment in [Alignment::FirstChild, Alignment::Center, Alignment::LastChild] {
            let forest = forest_from(
                vec![Row::new("a", None, 0), Row::new("b", Some("a"), 1)],
                &["a"],
            );
            let layout = TidyTreeLayout::new(SPACING, alignment);
            let placed = layout.compute(&forest, forest.root().unwrap());
            assert_eq!(
                placed_x(&placed, &forest, "a"),
                placed_x(&placed, &forest, "b"),
                "{alignment:?}"
            );
        }
    }

    #[test]
    fn test_closed_root_places_only_itself() {
        let forest = forest_from(
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("a"), 2),
            ],
            &[],
        );
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);
        let placed = layout.compute(&forest, forest.root().unwrap());

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].parent, None);
    }

    #[test]
    fn test_closed_branch_hides_its_descendants_only() {
        // a -> b -> c, a -> d; b closed hides c but not b or d.
        let forest = forest_from(
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("b"), 2),
                Row::new("d", Some("a"), 3),
            ],
            &["a"],
        );
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);
        let placed = layout.compute(&forest, forest.root().unwrap());

        assert_eq!(placed.len(), 3);
        let c = forest.find("c").unwrap();
        assert!(placed.iter().all(|p| p.node != c));
    }

    #[test]
    fn test_subtrees_do_not_overlap() {
        // a has two subtrees: b (with two leaves) and e (leaf).
        let forest = forest_from(
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("b"), 2),
                Row::new("d", Some("b"), 3),
                Row::new("e", Some("a"), 4),
            ],
            &["a", "b"],
        );
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);
        let placed = layout.compute(&forest, forest.root().unwrap());

        assert_eq!(placed.len(), 5);

        // No two nodes on the same level sit closer than one sibling slot.
        for one in &placed {
            for two in &placed {
                if one.node != two.node && one.depth == two.depth {
                    assert!(
                        (one.x - two.x).abs() >= SPACING.sibling - 0.01,
                        "{} and {} overlap at depth {}",
                        forest.node(one.node).node_id(),
                        forest.node(two.node).node_id(),
                        one.depth
                    );
                }
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let rows = || {
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("a"), 2),
                Row::new("d", Some("b"), 3),
            ]
        };
        let forest_one = forest_from(rows(), &["a", "b"]);
        let forest_two = forest_from(rows(), &["a", "b"]);
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);

        let one = layout.compute(&forest_one, forest_one.root().unwrap());
        let two = layout.compute(&forest_two, forest_two.root().unwrap());
        assert_eq!(one, two);
    }

    #[test]
    fn test_pre_order_parent_indices() {
        let forest = forest_from(
            vec![
                Row::new("a", None, 0),
                Row::new("b", Some("a"), 1),
                Row::new("c", Some("b"), 2),
            ],
            &["a", "b"],
        );
        let layout = TidyTreeLayout::new(SPACING, Alignment::Center);
        let placed = layout.compute(&forest, forest.root().unwrap());

        for (at, p) in placed.iter().enumerate() {
            if let Some(parent) = p.parent {
                assert!(parent < at, "parents precede children in the output");
            }
        }
    }
}
