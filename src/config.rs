//! Chart configuration.
//!
//! The host supplies a configuration object with every render; missing
//! fields fall back to the stock defaults below. Direction and alignment
//! stay strings here and are parsed leniently at render time, so an
//! unrecognized value degrades instead of failing deserialization.

use serde::{Deserialize, Serialize};

use crate::layout::{Alignment, Direction, NodeSpacing};

/// Side length of the square collapse-toggle icon.
pub const CHILD_TOGGLE_SIZE: f32 = 12.0;

/// Per-render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Maximum number of rows rendered before refusing with an error.
    pub row_limit: usize,
    /// Maximum number of trellis panels before refusing with an error.
    pub max_trellis_count: usize,
    /// Whether nodes can be collapsed at all. When off, every node renders
    /// open and no toggle icons are produced.
    pub enable_node_collapse: bool,
    pub node_width: f32,
    pub node_height: f32,
    /// Padding between sibling node boxes.
    pub node_padding_sibling: f32,
    /// Padding between generations.
    pub node_padding_ancestor: f32,
    /// Where the link elbow bends, as a fraction of the gap from the
    /// ancestor side.
    pub node_sibling_link_offset: f32,
    pub node_direction: String,
    pub node_alignment: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            row_limit: 2000,
            max_trellis_count: 10,
            enable_node_collapse: true,
            node_width: 150.0,
            node_height: 60.0,
            node_padding_sibling: 10.0,
            node_padding_ancestor: 40.0,
            node_sibling_link_offset: 0.5,
            node_direction: "top-to-bottom".to_owned(),
            node_alignment: "center".to_owned(),
        }
    }
}

impl ChartConfig {
    /// The parsed flow direction, if the configured string is recognized.
    pub fn direction(&self) -> Option<Direction> {
        Direction::parse(&self.node_direction)
    }

    /// The parsed alignment; unrecognized strings fall back to centering.
    pub fn alignment(&self) -> Alignment {
        Alignment::parse(&self.node_alignment).unwrap_or_default()
    }

    /// The effective toggle icon size.
    pub fn toggle_size(&self) -> f32 {
        if self.enable_node_collapse {
            CHILD_TOGGLE_SIZE
        } else {
            0.0
        }
    }

    /// Layout spacing for the given orientation: the sibling axis carries
    /// the node box side that faces siblings, the generation axis the side
    /// that faces the parent.
    pub fn node_spacing(&self, direction: Direction) -> NodeSpacing {
        if direction.is_horizontal() {
            NodeSpacing {
                sibling: self.node_height + self.node_padding_sibling,
                ancestor: self.node_width + self.node_padding_ancestor,
            }
        } else {
            NodeSpacing {
                sibling: self.node_width + self.node_padding_sibling,
                ancestor: self.node_height + self.node_padding_ancestor,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_configuration() {
        let config = ChartConfig::default();
        assert_eq!(config.row_limit, 2000);
        assert_eq!(config.max_trellis_count, 10);
        assert!(config.enable_node_collapse);
        assert_eq!(config.node_width, 150.0);
        assert_eq!(config.node_height, 60.0);
        assert_eq!(config.node_padding_sibling, 10.0);
        assert_eq!(config.node_padding_ancestor, 40.0);
        assert_eq!(config.node_sibling_link_offset, 0.5);
        assert_eq!(config.direction(), Some(Direction::TopToBottom));
        assert_eq!(config.alignment(), Alignment::Center);
    }

    #[test]
    fn test_spacing_swaps_with_orientation() {
        let config = ChartConfig::default();
        let vertical = config.node_spacing(Direction::TopToBottom);
        assert_eq!(vertical.sibling, 160.0);
        assert_eq!(vertical.ancestor, 100.0);

        let horizontal = config.node_spacing(Direction::RightToLeft);
        assert_eq!(horizontal.sibling, 70.0);
        assert_eq!(horizontal.ancestor, 190.0);
    }

    #[test]
    fn test_toggle_size_follows_collapse_flag() {
        let mut config = ChartConfig::default();
        assert_eq!(config.toggle_size(), CHILD_TOGGLE_SIZE);
        config.enable_node_collapse = false;
        assert_eq!(config.toggle_size(), 0.0);
    }

    #[test]
    fn test_unknown_alignment_falls_back_to_center() {
        let config = ChartConfig {
            node_alignment: "diagonal".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.alignment(), Alignment::Center);
    }
}
