//! Trellis partitioning of input rows.
//!
//! A trellis key splits the data into independent diagrams, each with its
//! own hierarchy and open-node scope. Rows without a key all land in a
//! single default panel. Panels iterate in name order, matching the order
//! the host lays its panels out in.

use std::collections::BTreeMap;

use crate::hierarchy::Row;

/// Panel name used for rows without a trellis key.
pub const DEFAULT_PANEL: &str = "";

/// Rows partitioned by trellis key.
#[derive(Debug)]
pub struct TrellisMap<P> {
    panels: BTreeMap<String, Vec<Row<P>>>,
}

impl<P> TrellisMap<P> {
    /// Partition rows by their trellis key, preserving row order within
    /// each panel.
    pub fn partition(rows: Vec<Row<P>>) -> Self {
        let mut panels: BTreeMap<String, Vec<Row<P>>> = BTreeMap::new();
        for row in rows {
            let key = row
                .trellis_by
                .clone()
                .unwrap_or_else(|| DEFAULT_PANEL.to_owned());
            panels.entry(key).or_default().push(row);
        }
        Self { panels }
    }

    /// Number of panels.
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Panel names in iteration (sorted) order.
    pub fn names(&self) -> Vec<String> {
        self.panels.keys().cloned().collect()
    }

    /// Consume the map, yielding panels in name order.
    pub fn into_panels(self) -> impl Iterator<Item = (String, Vec<Row<P>>)> {
        self.panels.into_iter()
    }
}
