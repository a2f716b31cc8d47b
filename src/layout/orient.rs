//! Orientation mapping and elbow-link synthesis.
//!
//! Takes the orientation-neutral tidy layout and produces screen-space
//! geometry for one of the four flow directions: each node's final center,
//! the anchor for its collapse toggle, and a 4-point orthogonal connector
//! to its parent. The four directions share one pass parameterized by an
//! axis swap (horizontal flow) and a mirror sign (reversed flow); the
//! mirrored form `childAttach + (1 - offset) * gap` reduces to the signed
//! form used here, so the offset fraction always measures from the
//! ancestor side.

use serde::Serialize;

use super::tidy_tree::PlacedNode;
use crate::hierarchy::NodeIdx;

/// Diagram flow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// Parse the host's configuration string. Unrecognized values are the
    /// caller's problem to report; nothing renders under them.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top-to-bottom" => Some(Self::TopToBottom),
            "bottom-to-top" => Some(Self::BottomToTop),
            "left-to-right" => Some(Self::LeftToRight),
            "right-to-left" => Some(Self::RightToLeft),
            _ => None,
        }
    }

    /// The configuration string for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopToBottom => "top-to-bottom",
            Self::BottomToTop => "bottom-to-top",
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
        }
    }

    /// Whether generations advance along the screen x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Whether flow runs against the screen axis (mirrored rendering).
    fn is_mirrored(self) -> bool {
        matches!(self, Self::BottomToTop | Self::RightToLeft)
    }
}

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// 4-point orthogonal polyline from a parent node's edge to a child's:
/// parent attach, two elbow bends, child attach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Link(pub [Point; 4]);

/// Screen-space placement of one visible node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedNode {
    /// Arena index in the source forest.
    pub node: NodeIdx,
    /// Final center of the node box.
    pub center: Point,
    /// Top-left corner of the toggle icon box, relative to the center.
    pub toggle: Point,
}

/// Parameters for one orientation pass.
#[derive(Debug, Clone, Copy)]
pub struct OrientConfig {
    pub direction: Direction,
    pub node_width: f32,
    pub node_height: f32,
    /// Toggle icon box size; zero when collapse is disabled.
    pub toggle_size: f32,
    /// Elbow offset fraction in `[0, 1]`, measured from the parent attach.
    pub link_offset: f32,
}

/// Map the layout onto the screen for the configured direction.
///
/// `placed` must be in pre-order (parents before children), as produced by
/// the layout engine. Returns one oriented node per input and one link per
/// non-root input.
pub fn orient(placed: &[PlacedNode], config: &OrientConfig) -> (Vec<OrientedNode>, Vec<Link>) {
    let horizontal = config.direction.is_horizontal();
    let mirrored = config.direction.is_mirrored();
    let sign = if mirrored { -1.0 } else { 1.0 };

    // Half of the node box along the generation axis.
    let half = if horizontal {
        config.node_width / 2.0
    } else {
        config.node_height / 2.0
    };
    let toggle = config.toggle_size;

    // The mirror coordinate comes from raw layout coordinates, taken over
    // the whole pass before any center is assigned.
    let max_flow = placed.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

    let to_screen = move |lateral: f32, flow: f32| -> Point {
        if horizontal {
            Point { x: flow, y: lateral }
        } else {
            Point { x: lateral, y: flow }
        }
    };

    // Toggle anchor relative to the center: a toggle-sized box on the node
    // edge facing away from the parent. Top-to-bottom keeps its historical
    // one-pixel nudge below the node edge.
    let toggle_flow = if mirrored {
        -(half + toggle)
    } else if horizontal {
        half
    } else {
        half + 1.0
    };
    let toggle_anchor = to_screen(-toggle / 2.0, toggle_flow);

    let mut nodes = Vec::with_capacity(placed.len());
    let mut links = Vec::with_capacity(placed.len().saturating_sub(1));
    let mut lateral_flow = Vec::with_capacity(placed.len());

    for p in placed {
        let flow = if mirrored { max_flow - p.y } else { p.y };
        let lateral = p.x;
        lateral_flow.push((lateral, flow));

        nodes.push(OrientedNode {
            node: p.node,
            center: to_screen(lateral, flow),
            toggle: toggle_anchor,
        });

        if let Some(parent) = p.parent {
            let (parent_lateral, parent_flow) = lateral_flow[parent];
            // Attach outside the toggle on the parent side, on the box edge
            // on the child side.
            let parent_attach = parent_flow + sign * (half + toggle);
            let child_attach = flow - sign * half;
            let gap = (child_attach - parent_attach).abs();
            let elbow = parent_attach + sign * gap * config.link_offset;

            links.push(Link([
                to_screen(parent_lateral, parent_attach),
                to_screen(parent_lateral, elbow),
                to_screen(lateral, elbow),
                to_screen(lateral, child_attach),
            ]));
        }
    }

    (nodes, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE_WIDTH: f32 = 150.0;
    const NODE_HEIGHT: f32 = 60.0;
    const TOGGLE: f32 = 12.0;

    fn config(direction: Direction) -> OrientConfig {
        OrientConfig {
            direction,
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            toggle_size: TOGGLE,
            link_offset: 0.5,
        }
    }

    /// Root with two children, in the generation spacing the chart would
    /// use for the given orientation (box size + 40 ancestor padding).
    fn fork(horizontal: bool) -> Vec<PlacedNode> {
        let step = if horizontal {
            NODE_WIDTH + 40.0
        } else {
            NODE_HEIGHT + 40.0
        };
        vec![
            PlacedNode {
                node: NodeIdx::new(0),
                parent: None,
                depth: 0,
                x: 80.0,
                y: 0.0,
            },
            PlacedNode {
                node: NodeIdx::new(1),
                parent: Some(0),
                depth: 1,
                x: 0.0,
                y: step,
            },
            PlacedNode {
                node: NodeIdx::new(2),
                parent: Some(0),
                depth: 1,
                x: 160.0,
                y: step,
            },
        ]
    }

    #[test]
    fn test_top_to_bottom_geometry() {
        let (nodes, links) = orient(&fork(false), &config(Direction::TopToBottom));

        assert_eq!(nodes.len(), 3);
        assert_eq!(links.len(), 2, "one link per non-root node");

        assert_eq!(nodes[0].center, Point { x: 80.0, y: 0.0 });
        assert_eq!(nodes[1].center, Point { x: 0.0, y: 100.0 });
        assert_eq!(nodes[2].center, Point { x: 160.0, y: 100.0 });

        // Toggle centered below the node, nudged one pixel clear of the edge.
        assert_eq!(
            nodes[0].toggle,
            Point {
                x: -TOGGLE / 2.0,
                y: NODE_HEIGHT / 2.0 + 1.0
            }
        );

        // Parent attach below the toggle, child attach on the top edge,
        // elbow halfway between.
        let Link(points) = links[0];
        assert_eq!(points[0], Point { x: 80.0, y: 42.0 });
        assert_eq!(points[1], Point { x: 80.0, y: 56.0 });
        assert_eq!(points[2], Point { x: 0.0, y: 56.0 });
        assert_eq!(points[3], Point { x: 0.0, y: 70.0 });
    }

    #[test]
    fn test_bottom_to_top_mirrors_top_to_bottom() {
        let placed = fork(false);
        let (down, _) = orient(&placed, &config(Direction::TopToBottom));
        let (up, up_links) = orient(&placed, &config(Direction::BottomToTop));

        let max_y = placed.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        for (d, u) in down.iter().zip(&up) {
            assert_eq!(u.center.x, d.center.x);
            assert_eq!(u.center.y, max_y - d.center.y, "reflected about the extent");
        }

        // Toggle sits above the node, attach points flip sides.
        assert_eq!(
            up[0].toggle,
            Point {
                x: -TOGGLE / 2.0,
                y: -(NODE_HEIGHT / 2.0 + TOGGLE)
            }
        );
        let Link(points) = up_links[0];
        assert_eq!(points[0], Point { x: 80.0, y: 58.0 });
        assert_eq!(points[3], Point { x: 0.0, y: 30.0 });
    }

    #[test]
    fn test_left_to_right_swaps_axes() {
        let (nodes, links) = orient(&fork(true), &config(Direction::LeftToRight));

        assert_eq!(nodes[0].center, Point { x: 0.0, y: 80.0 });
        assert_eq!(nodes[1].center, Point { x: 190.0, y: 0.0 });

        assert_eq!(
            nodes[0].toggle,
            Point {
                x: NODE_WIDTH / 2.0,
                y: -TOGGLE / 2.0
            }
        );

        let Link(points) = links[0];
        assert_eq!(points[0], Point { x: 87.0, y: 80.0 });
        assert_eq!(points[1], Point { x: 101.0, y: 80.0 });
        assert_eq!(points[2], Point { x: 101.0, y: 0.0 });
        assert_eq!(points[3], Point { x: 115.0, y: 0.0 });
    }

    #[test]
    fn test_right_to_left_mirrors_left_to_right() {
        let placed = fork(true);
        let (ltr, _) = orient(&placed, &config(Direction::LeftToRight));
        let (rtl, rtl_links) = orient(&placed, &config(Direction::RightToLeft));

        let max_y = placed.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        for (l, r) in ltr.iter().zip(&rtl) {
            assert_eq!(r.center.y, l.center.y);
            assert_eq!(r.center.x, max_y - l.center.x);
        }

        assert_eq!(
            rtl[0].toggle,
            Point {
                x: -(NODE_WIDTH / 2.0 + TOGGLE),
                y: -TOGGLE / 2.0
            }
        );

        // Same elbow position as the original's
        // `childAttach + (1 - offset) * gap` formulation.
        let Link(points) = rtl_links[0];
        assert_eq!(points[0], Point { x: 103.0, y: 80.0 });
        assert_eq!(points[1], Point { x: 89.0, y: 80.0 });
        assert_eq!(points[2], Point { x: 89.0, y: 0.0 });
        assert_eq!(points[3], Point { x: 75.0, y: 0.0 });
    }

    #[test]
    fn test_offset_fraction_measures_from_the_ancestor() {
        for direction in [
            Direction::TopToBottom,
            Direction::BottomToTop,
            Direction::LeftToRight,
            Direction::RightToLeft,
        ] {
            let mut cfg = config(direction);
            cfg.link_offset = 0.25;
            let placed = fork(direction.is_horizontal());
            let (_, links) = orient(&placed, &cfg);

            for Link(points) in links {
                let attach_gap = if direction.is_horizontal() {
                    (points[3].x - points[0].x).abs()
                } else {
                    (points[3].y - points[0].y).abs()
                };
                let elbow_gap = if direction.is_horizontal() {
                    (points[1].x - points[0].x).abs()
                } else {
                    (points[1].y - points[0].y).abs()
                };
                assert!(
                    (elbow_gap - attach_gap * 0.25).abs() < 0.01,
                    "{direction:?}: elbow should bend a quarter of the way"
                );
            }
        }
    }

    #[test]
    fn test_collapse_disabled_attaches_on_the_node_edge() {
        let mut cfg = config(Direction::TopToBottom);
        cfg.toggle_size = 0.0;
        let (_, links) = orient(&fork(false), &cfg);

        let Link(points) = links[0];
        assert_eq!(points[0].y, NODE_HEIGHT / 2.0);
    }

    #[test]
    fn test_direction_parse_round_trip() {
        for name in [
            "top-to-bottom",
            "bottom-to-top",
            "left-to-right",
            "right-to-left",
        ] {
            assert_eq!(Direction::parse(name).unwrap().as_str(), name);
        }
        assert_eq!(Direction::parse("inside-out"), None);
        assert_eq!(Direction::parse(""), None);
    }
}
