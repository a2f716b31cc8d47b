//! Hierarchy data structures and construction.
//!
//! This module turns the host's flat rows into an arena-backed forest:
//! nodes are addressed by stable `NodeIdx` indices, the parent relation is
//! an index rather than an owning reference, and children keep
//! row-encounter order. The whole forest is rebuilt from scratch on every
//! data update.

mod builder;
mod node;

pub use builder::{build_forest, Forest, Row};
pub use node::{NodeIdx, OrgNode};
