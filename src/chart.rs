//! Diagram controller: the render pipeline and its interactions.
//!
//! Owns the full flow from host rows to drawable scenes: limits validation,
//! trellis partitioning, hierarchy construction, tidy layout, orientation
//! mapping, and the spatial index behind rectangle marking. Every data or
//! toggle change rebuilds the affected panel from scratch; the only state
//! that survives a pass is the open-node map and the scroll position, both
//! owned by the host.

use serde::Serialize;

use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::hierarchy::{build_forest, Forest, NodeIdx, Row};
use crate::layout::{orient, Link, OrientConfig, Point, TidyTreeLayout};
use crate::spatial::{HitIndex, NodeBox};
use crate::state::{self, OpenNodeMap};
use crate::trellis::TrellisMap;

/// Bounding box of everything drawn in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Extent {
    fn fold(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// One visible node, ready to draw.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode<P> {
    pub node_id: String,
    /// Payload of the backing row; a placeholder whose own row never
    /// appeared renders without one.
    pub row: Option<P>,
    /// Center of the node box in screen space.
    pub center: Point,
    pub width: f32,
    pub height: f32,
    pub has_children: bool,
    pub is_open: bool,
    /// Toggle icon anchor relative to the center; present only when the
    /// node can actually be toggled.
    pub toggle: Option<Point>,
}

/// Everything the host needs to draw one panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene<P> {
    pub nodes: Vec<SceneNode<P>>,
    pub links: Vec<Link>,
    pub extent: Option<Extent>,
    /// Node the host should scroll into the viewport center, set after a
    /// toggle.
    pub center_on: Option<String>,
}

impl<P> Scene<P> {
    fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            extent: None,
            center_on: None,
        }
    }
}

/// One trellis panel: its hierarchy, last rendered scene, and hit index.
pub struct Panel<P> {
    name: String,
    forest: Forest<P>,
    scene: Scene<P>,
    hit: HitIndex,
}

impl<P> Panel<P> {
    /// The trellis name (empty for the default panel).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last rendered scene.
    pub fn scene(&self) -> &Scene<P> {
        &self.scene
    }
}

/// Context menu entry offered on a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub text: String,
    pub enabled: bool,
    pub open: bool,
    pub recursive: bool,
}

/// The diagram: all panels plus shared configuration and open-node state.
pub struct OrgChart<P> {
    config: ChartConfig,
    open_map: OpenNodeMap,
    panels: Vec<Panel<P>>,
    /// Panel and node of the context menu the host is currently awaiting.
    /// Blocks every other toggle until resolved or cancelled.
    pending_menu: Option<(String, String)>,
    open_map_dirty: bool,
    scroll_top: f32,
    scroll_left: f32,
}

impl<P: Clone> OrgChart<P> {
    /// Create a chart with the given configuration and no data.
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            open_map: OpenNodeMap::new(),
            panels: Vec::new(),
            pending_menu: None,
            open_map_dirty: false,
            scroll_top: 0.0,
            scroll_left: 0.0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next update; the host
    /// re-sends its rows after a configuration change.
    pub fn set_config(&mut self, config: ChartConfig) {
        self.config = config;
    }

    /// Load the persisted open-node map.
    pub fn set_open_map(&mut self, map: OpenNodeMap) {
        self.open_map = map;
    }

    /// The open-node map in its persistence shape.
    pub fn open_map(&self) -> &OpenNodeMap {
        &self.open_map
    }

    /// Whether the open-node map changed since the last call; the host owes
    /// the persistence property a save when true.
    pub fn take_open_map_dirty(&mut self) -> bool {
        std::mem::take(&mut self.open_map_dirty)
    }

    /// Record the host's scroll position.
    pub fn set_scroll(&mut self, top: f32, left: f32) {
        self.scroll_top = top;
        self.scroll_left = left;
    }

    /// The last recorded scroll position as (top, left).
    pub fn scroll(&self) -> (f32, f32) {
        (self.scroll_top, self.scroll_left)
    }

    /// Rebuild every panel from a fresh row set.
    ///
    /// Fails without touching the previous panels when the row or trellis
    /// limits are exceeded, a row has no node id, or parent references form
    /// a cycle. An outstanding context menu is dropped either way, since
    /// the node it referred to may be gone.
    pub fn update(&mut self, rows: Vec<Row<P>>) -> Result<(), ChartError> {
        self.pending_menu = None;

        if rows.len() > self.config.row_limit {
            return Err(ChartError::TooManyRows {
                count: rows.len(),
                limit: self.config.row_limit,
            });
        }

        let trellis = TrellisMap::partition(rows);
        if trellis.panel_count() > self.config.max_trellis_count {
            return Err(ChartError::TooManyTrellisPanels {
                count: trellis.panel_count(),
                limit: self.config.max_trellis_count,
            });
        }

        let names = trellis.names();
        self.open_map_dirty |= self.open_map.validate_panels(&names);

        let mut panels = Vec::with_capacity(names.len());
        for (name, panel_rows) in trellis.into_panels() {
            let open = self.open_map.panel_mut(&name);
            let (forest, pruned) =
                build_forest(panel_rows, open, self.config.enable_node_collapse)?;
            self.open_map_dirty |= pruned;

            let mut panel = Panel {
                name,
                forest,
                scene: Scene::empty(),
                hit: HitIndex::new(),
            };
            render_panel(&mut panel, &self.config, None);
            panels.push(panel);
        }

        self.panels = panels;
        Ok(())
    }

    /// Number of rendered panels.
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Panels in trellis-name order.
    pub fn panels(&self) -> &[Panel<P>] {
        &self.panels
    }

    /// Look up a panel by trellis name.
    pub fn panel(&self, name: &str) -> Option<&Panel<P>> {
        self.panels.iter().find(|panel| panel.name == name)
    }

    /// A plain toggle click: flip the node, persist, re-render the panel,
    /// and ask the host to center on the node.
    ///
    /// Ignored (returns false) while a context menu is outstanding, when
    /// collapse is disabled, or when the node is unknown.
    pub fn toggle_click(&mut self, panel: &str, node_id: &str) -> bool {
        if self.pending_menu.is_some() || !self.config.enable_node_collapse {
            return false;
        }
        let Some(at) = self.panel_position(panel) else {
            return false;
        };
        let Some(idx) = self.panels[at].forest.find(node_id) else {
            return false;
        };

        let target = !self.panels[at].forest.node(idx).is_open();
        self.apply_toggle(at, idx, target, false);
        true
    }

    /// Compose the context menu for a node and mark the menu outstanding.
    ///
    /// Returns `None` while another menu is outstanding or the node is
    /// unknown; otherwise the items to show. The host resolves the menu
    /// with [`apply_context_menu`](Self::apply_context_menu) or
    /// [`cancel_context_menu`](Self::cancel_context_menu).
    pub fn context_menu_items(&mut self, panel: &str, node_id: &str) -> Option<Vec<MenuItem>> {
        if self.pending_menu.is_some() || !self.config.enable_node_collapse {
            return None;
        }
        let at = self.panel_position(panel)?;
        let idx = self.panels[at].forest.find(node_id)?;

        let items = if self.panels[at].forest.node(idx).is_open() {
            vec![
                MenuItem {
                    text: "Close".to_owned(),
                    enabled: true,
                    open: false,
                    recursive: false,
                },
                MenuItem {
                    text: "Close all descendants".to_owned(),
                    enabled: true,
                    open: false,
                    recursive: true,
                },
            ]
        } else {
            vec![
                MenuItem {
                    text: "Open".to_owned(),
                    enabled: true,
                    open: true,
                    recursive: false,
                },
                MenuItem {
                    text: "Open all descendants".to_owned(),
                    enabled: true,
                    open: true,
                    recursive: true,
                },
            ]
        };

        self.pending_menu = Some((panel.to_owned(), node_id.to_owned()));
        Some(items)
    }

    /// Apply the host's awaited menu choice.
    ///
    /// Only honored for the node the outstanding menu was composed for.
    pub fn apply_context_menu(
        &mut self,
        panel: &str,
        node_id: &str,
        open: bool,
        recursive: bool,
    ) -> bool {
        match self.pending_menu.take() {
            Some((menu_panel, menu_node)) if menu_panel == panel && menu_node == node_id => {}
            other => {
                self.pending_menu = other;
                return false;
            }
        }

        let Some(at) = self.panel_position(panel) else {
            return false;
        };
        let Some(idx) = self.panels[at].forest.find(node_id) else {
            return false;
        };

        self.apply_toggle(at, idx, open, recursive);
        true
    }

    /// The host dismissed the menu without a choice.
    pub fn cancel_context_menu(&mut self) {
        self.pending_menu = None;
    }

    /// Payload rows whose rendered node boxes intersect the selection
    /// rectangle, for drag-rectangle marking. No ordering guarantee.
    pub fn select_in_rect(
        &self,
        panel: &str,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Vec<P> {
        let Some(panel) = self.panel(panel) else {
            return Vec::new();
        };
        panel
            .hit
            .in_rect(left, top, right, bottom)
            .into_iter()
            .filter_map(|idx| panel.forest.node(idx).payload().cloned())
            .collect()
    }

    /// The payload behind a node id, for tooltips and single-node marking.
    pub fn row_payload(&self, panel: &str, node_id: &str) -> Option<P> {
        let panel = self.panel(panel)?;
        let idx = panel.forest.find(node_id)?;
        panel.forest.node(idx).payload().cloned()
    }

    fn panel_position(&self, name: &str) -> Option<usize> {
        self.panels.iter().position(|panel| panel.name == name)
    }

    fn apply_toggle(&mut self, at: usize, idx: NodeIdx, open: bool, recursive: bool) {
        let panel = &mut self.panels[at];
        let set = self.open_map.panel_mut(&panel.name);
        state::toggle(&mut panel.forest, set, idx, open, recursive);
        self.open_map_dirty = true;

        let center_on = panel.forest.node(idx).node_id().to_owned();
        render_panel(panel, &self.config, Some(center_on));
    }
}

/// Lay out and orient one panel, refreshing its scene and hit index.
fn render_panel<P: Clone>(panel: &mut Panel<P>, config: &ChartConfig, center_on: Option<String>) {
    let Some(root) = panel.forest.root() else {
        panel.scene = Scene::empty();
        panel.hit.clear();
        return;
    };

    let Some(direction) = config.direction() else {
        log::warn!(
            "unknown direction {:?}; nothing rendered",
            config.node_direction
        );
        panel.scene = Scene::empty();
        panel.hit.clear();
        return;
    };

    let layout = TidyTreeLayout::new(config.node_spacing(direction), config.alignment());
    let placed = layout.compute(&panel.forest, root);

    let orient_config = OrientConfig {
        direction,
        node_width: config.node_width,
        node_height: config.node_height,
        toggle_size: config.toggle_size(),
        link_offset: config.node_sibling_link_offset,
    };
    let (oriented, links) = orient(&placed, &orient_config);

    let mut nodes = Vec::with_capacity(oriented.len());
    let mut boxes = Vec::with_capacity(oriented.len());
    for entry in &oriented {
        let node = panel.forest.node(entry.node);
        let can_toggle = config.enable_node_collapse && node.has_children();
        nodes.push(SceneNode {
            node_id: node.node_id().to_owned(),
            row: node.payload().cloned(),
            center: entry.center,
            width: config.node_width,
            height: config.node_height,
            has_children: node.has_children(),
            is_open: node.is_open(),
            toggle: can_toggle.then_some(entry.toggle),
        });
        boxes.push(NodeBox::from_center(
            entry.node,
            entry.center.x,
            entry.center.y,
            config.node_width,
            config.node_height,
        ));
    }

    let extent = compute_extent(&nodes, &links, config.toggle_size());
    panel.hit.rebuild(boxes);
    panel.scene = Scene {
        nodes,
        links,
        extent,
        center_on,
    };
}

/// Bounding box over node boxes, toggle icons, and link points.
fn compute_extent<P>(nodes: &[SceneNode<P>], links: &[Link], toggle_size: f32) -> Option<Extent> {
    let first = nodes.first()?;
    let mut extent = Extent {
        min_x: first.center.x,
        min_y: first.center.y,
        max_x: first.center.x,
        max_y: first.center.y,
    };

    for node in nodes {
        extent.fold(node.center.x - node.width / 2.0, node.center.y - node.height / 2.0);
        extent.fold(node.center.x + node.width / 2.0, node.center.y + node.height / 2.0);
        if let Some(anchor) = node.toggle {
            extent.fold(node.center.x + anchor.x, node.center.y + anchor.y);
            extent.fold(
                node.center.x + anchor.x + toggle_size,
                node.center.y + anchor.y + toggle_size,
            );
        }
    }
    for Link(points) in links {
        for point in points {
            extent.fold(point.x, point.y);
        }
    }

    Some(extent)
}
