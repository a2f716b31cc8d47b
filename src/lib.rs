//! Organization Chart - WASM Module
//!
//! Headless hierarchy-diagram engine for the Organization Chart
//! visualization. The module is compiled to WebAssembly and embedded in the
//! analytics host, which feeds it flat rows (node id / parent node id /
//! trellis key) plus a configuration object and draws the scenes it returns:
//! node centers, collapse-toggle anchors, and elbow link polylines.
//!
//! # Architecture
//!
//! - `hierarchy`: arena-backed forest built from the flat rows
//! - `layout`: tidy tree coordinates plus orientation mapping for the four
//!   flow directions
//! - `state`: open-node tracking and its host-persisted form
//! - `spatial`: R-tree hit testing behind drag-rectangle marking
//! - `chart`: the per-panel pipeline and interaction handling
//!
//! The core is pure Rust and testable natively; only this file talks to
//! JavaScript.

use js_sys::Function;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod spatial;
pub mod state;
pub mod trellis;

use chart::OrgChart;
use config::ChartConfig;
use hierarchy::Row;
use state::OpenNodeMap;

/// Initialize the WASM module: panic diagnostics and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Repeated initialization (hot reload) is harmless.
    let _ = console_log::init_with_level(log::Level::Warn);
}

/// Classify a hex color as light, for contrast-aware node styling.
#[wasm_bindgen(js_name = hexIsLight)]
pub fn hex_is_light(hex: &str) -> bool {
    color::hex_is_light(hex)
}

/// Whether the host canvas background is dark.
#[wasm_bindgen(js_name = isDarkCanvas)]
pub fn is_dark_canvas(background: &str) -> bool {
    color::is_dark_canvas(background)
}

/// One host row as it crosses the boundary.
///
/// The engine never sees row content; the payload handed back through
/// scenes, selection, and marking is the row's position in the update
/// array, which the host resolves against its own data view.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostRow {
    node_id: String,
    #[serde(default)]
    parent_node_id: Option<String>,
    #[serde(default)]
    trellis_by: Option<String>,
}

/// Main entry point for the chart engine.
///
/// Wraps the internal [`OrgChart`] and provides the public API exposed to
/// JavaScript.
#[wasm_bindgen]
pub struct OrgChartWasm {
    chart: OrgChart<u32>,
    on_mark_rows: Option<Function>,
    on_show_tooltip: Option<Function>,
    on_hide_tooltip: Option<Function>,
    on_set_open_nodes: Option<Function>,
}

#[wasm_bindgen]
impl OrgChartWasm {
    /// Create a chart engine with the stock configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            chart: OrgChart::new(ChartConfig::default()),
            on_mark_rows: None,
            on_show_tooltip: None,
            on_hide_tooltip: None,
            on_set_open_nodes: None,
        }
    }

    // =========================================================================
    // Configuration and Persistence
    // =========================================================================

    /// Replace the configuration. Missing fields keep their defaults; takes
    /// effect on the next update.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: ChartConfig =
            serde_wasm_bindgen::from_value(config).map_err(JsValue::from)?;
        self.chart.set_config(config);
        Ok(())
    }

    /// Load the persisted open-node mapping (trellis name to id list).
    #[wasm_bindgen(js_name = loadOpenNodes)]
    pub fn load_open_nodes(&mut self, value: JsValue) -> Result<(), JsValue> {
        let map: OpenNodeMap = serde_wasm_bindgen::from_value(value).map_err(JsValue::from)?;
        self.chart.set_open_map(map);
        Ok(())
    }

    /// The open-node mapping in its persistence shape.
    #[wasm_bindgen(js_name = openNodes)]
    pub fn open_nodes(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.chart.open_map()).map_err(JsValue::from)
    }

    /// Record the host's scroll position for later restore.
    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&mut self, top: f32, left: f32) {
        self.chart.set_scroll(top, left);
    }

    /// Last recorded scroll top.
    #[wasm_bindgen(js_name = scrollTop)]
    pub fn scroll_top(&self) -> f32 {
        self.chart.scroll().0
    }

    /// Last recorded scroll left.
    #[wasm_bindgen(js_name = scrollLeft)]
    pub fn scroll_left(&self) -> f32 {
        self.chart.scroll().1
    }

    // =========================================================================
    // Host Callbacks
    // =========================================================================

    /// Register the marking callback: `(ctrlKey: boolean, rows: number[])`.
    #[wasm_bindgen(js_name = onMarkRows)]
    pub fn set_on_mark_rows(&mut self, callback: Function) {
        self.on_mark_rows = Some(callback);
    }

    /// Register the tooltip-show callback: `(row: number)`.
    #[wasm_bindgen(js_name = onShowTooltip)]
    pub fn set_on_show_tooltip(&mut self, callback: Function) {
        self.on_show_tooltip = Some(callback);
    }

    /// Register the tooltip-hide callback: `()`.
    #[wasm_bindgen(js_name = onHideTooltip)]
    pub fn set_on_hide_tooltip(&mut self, callback: Function) {
        self.on_hide_tooltip = Some(callback);
    }

    /// Register the open-node persistence callback: `(openNodes: object)`.
    /// Invoked whenever the engine mutates the set, including stale-id
    /// reconciliation during an update.
    #[wasm_bindgen(js_name = onSetOpenNodes)]
    pub fn set_on_set_open_nodes(&mut self, callback: Function) {
        self.on_set_open_nodes = Some(callback);
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Rebuild every panel from a fresh row array.
    ///
    /// Rows are `{nodeId, parentNodeId?, trellisBy?}` objects; their array
    /// positions become the row references in scenes and selection results.
    /// Rejects with the blocking message when limits are exceeded or the
    /// hierarchy is malformed.
    pub fn update(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let host_rows: Vec<HostRow> =
            serde_wasm_bindgen::from_value(rows).map_err(JsValue::from)?;
        let rows: Vec<Row<u32>> = host_rows
            .into_iter()
            .enumerate()
            .map(|(at, row)| Row {
                node_id: row.node_id,
                parent_node_id: row.parent_node_id,
                trellis_by: row.trellis_by,
                payload: at as u32,
            })
            .collect();

        self.chart
            .update(rows)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.flush_open_nodes();
        Ok(())
    }

    /// Number of rendered trellis panels.
    #[wasm_bindgen(js_name = panelCount)]
    pub fn panel_count(&self) -> usize {
        self.chart.panel_count()
    }

    /// Trellis name of the panel at `at` (empty for the default panel).
    #[wasm_bindgen(js_name = panelName)]
    pub fn panel_name(&self, at: usize) -> Option<String> {
        self.chart.panels().get(at).map(|panel| panel.name().to_owned())
    }

    /// The drawable scene of the panel at `at`: nodes, links, extent, and
    /// the optional node to center on.
    pub fn scene(&self, at: usize) -> Result<JsValue, JsValue> {
        match self.chart.panels().get(at) {
            Some(panel) => serde_wasm_bindgen::to_value(panel.scene()).map_err(JsValue::from),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// A click on a node's collapse toggle. Returns true when the toggle
    /// was applied; the host then re-reads the panel's scene and honors its
    /// `centerOn` directive.
    #[wasm_bindgen(js_name = toggleClick)]
    pub fn toggle_click(&mut self, panel: &str, node_id: &str) -> bool {
        let applied = self.chart.toggle_click(panel, node_id);
        if applied {
            self.flush_open_nodes();
        }
        applied
    }

    /// Compose the context menu for a node's toggle. Returns the item array
    /// to show, or undefined while another menu is outstanding. The host
    /// must resolve the menu with `applyContextMenu` or
    /// `cancelContextMenu`.
    #[wasm_bindgen(js_name = contextMenuItems)]
    pub fn context_menu_items(&mut self, panel: &str, node_id: &str) -> Result<JsValue, JsValue> {
        match self.chart.context_menu_items(panel, node_id) {
            Some(items) => serde_wasm_bindgen::to_value(&items).map_err(JsValue::from),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Apply the user's awaited context-menu choice.
    #[wasm_bindgen(js_name = applyContextMenu)]
    pub fn apply_context_menu(
        &mut self,
        panel: &str,
        node_id: &str,
        open: bool,
        recursive: bool,
    ) -> bool {
        let applied = self.chart.apply_context_menu(panel, node_id, open, recursive);
        if applied {
            self.flush_open_nodes();
        }
        applied
    }

    /// The user dismissed the context menu without a choice.
    #[wasm_bindgen(js_name = cancelContextMenu)]
    pub fn cancel_context_menu(&mut self) {
        self.chart.cancel_context_menu();
    }

    /// Row references whose node boxes intersect the selection rectangle,
    /// in the panel's scene coordinates.
    #[wasm_bindgen(js_name = selectInRect)]
    pub fn select_in_rect(
        &self,
        panel: &str,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Vec<u32> {
        self.chart.select_in_rect(panel, left, top, right, bottom)
    }

    /// A non-drag mouse-up on a node: mark its row.
    #[wasm_bindgen(js_name = nodeMouseUp)]
    pub fn node_mouse_up(&self, panel: &str, node_id: &str, ctrl_key: bool) {
        let Some(row) = self.chart.row_payload(panel, node_id) else {
            return;
        };
        if let Some(callback) = &self.on_mark_rows {
            let rows = js_sys::Array::of1(&JsValue::from(row));
            let _ = callback.call2(&JsValue::NULL, &JsValue::from_bool(ctrl_key), &rows);
        }
    }

    /// The pointer entered a node: show its tooltip.
    #[wasm_bindgen(js_name = nodeHover)]
    pub fn node_hover(&self, panel: &str, node_id: &str) {
        let Some(row) = self.chart.row_payload(panel, node_id) else {
            return;
        };
        if let Some(callback) = &self.on_show_tooltip {
            let _ = callback.call1(&JsValue::NULL, &JsValue::from(row));
        }
    }

    /// The pointer left a node: hide the tooltip.
    #[wasm_bindgen(js_name = nodeUnhover)]
    pub fn node_unhover(&self) {
        if let Some(callback) = &self.on_hide_tooltip {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    /// Push the open-node mapping to the host when it changed.
    fn flush_open_nodes(&mut self) {
        if !self.chart.take_open_map_dirty() {
            return;
        }
        if let Some(callback) = &self.on_set_open_nodes {
            if let Ok(value) = serde_wasm_bindgen::to_value(self.chart.open_map()) {
                let _ = callback.call1(&JsValue::NULL, &value);
            }
        }
    }
}

impl Default for OrgChartWasm {
    fn default() -> Self {
        Self::new()
    }
}
