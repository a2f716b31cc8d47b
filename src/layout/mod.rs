//! Layout algorithms for the hierarchy diagram.
//!
//! This module computes geometry in two stages: the tidy tree pass assigns
//! orientation-neutral coordinates to every visible node, and the
//! orientation pass maps them onto the screen for the configured flow
//! direction, synthesizing toggle anchors and elbow links along the way.

pub mod orient;
pub mod tidy_tree;

pub use orient::{orient, Direction, Link, OrientConfig, OrientedNode, Point};
pub use tidy_tree::{Alignment, NodeSpacing, PlacedNode, TidyTreeLayout};
