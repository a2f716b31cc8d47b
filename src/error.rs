//! Error types for the chart engine.
//!
//! Only blocking input conditions surface as errors: the host displays the
//! message instead of the diagram and does not retry. Recoverable anomalies
//! (stale open-node ids, payload-less placeholder nodes, an unrecognized
//! direction string) degrade in place and never reach this enum.

use thiserror::Error;

/// A condition that prevents the diagram from rendering at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// The data view exceeds the configured row limit.
    #[error(
        "cannot render - too many rows (count: {count}, limit: {limit}); \
         filter to a smaller subset of values or raise the row limit"
    )]
    TooManyRows { count: usize, limit: usize },

    /// The trellis axis produces more panels than the configured maximum.
    #[error(
        "cannot render - too many trellis panels (count: {count}, limit: {limit}); \
         trellis by a column with fewer values or filter to a smaller subset"
    )]
    TooManyTrellisPanels { count: usize, limit: usize },

    /// A row arrived without a node id. The host's axis validation normally
    /// prevents this; the engine still refuses to build a broken tree.
    #[error("row {row} has an empty node id")]
    MissingNodeId { row: usize },

    /// Parent references form a cycle, so no node is an unambiguous root and
    /// layout recursion would never terminate.
    #[error("parent node references form a cycle; the hierarchy cannot be laid out")]
    ParentCycle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_counts() {
        let err = ChartError::TooManyRows {
            count: 2500,
            limit: 2000,
        };
        let text = err.to_string();
        assert!(text.contains("2500"));
        assert!(text.contains("2000"));
    }
}
