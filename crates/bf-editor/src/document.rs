//! In-memory scene document implementing the [`Host`] boundary.
//!
//! A single page holding a tree of nodes (groups, frames, ellipses, text),
//! each carrying a string metadata record. Edges go from parent → child.
//! It models just enough of a design tool for a plugin session to run
//! against: font loading gates text edits, node creation can be refused,
//! and auto-layout frames stack their children horizontally or vertically.

use crate::host::{BadgeSpec, BuiltBadge, FrameSpec, Host, Materializer, TextSpec};
use bf_core::model::Color;
use bf_core::{FontName, MetadataStore, NodeId};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Page prefix of generated node ids (`1:7`, `1:8`, ...).
const PAGE_PREFIX: &str = "1";

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Stacking direction of an auto-layout frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutMode {
    Horizontal,
    Vertical,
}

/// The node kinds in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// Root of the document.
    Page,

    /// Group — sized by its children, no own paint.
    Group,

    /// Auto-layout frame.
    Frame {
        fill: Option<Color>,
        corner_radius: f32,
        padding: f32,
        item_spacing: f32,
        layout: LayoutMode,
    },

    /// Ellipse / circle.
    Ellipse { fill: Color },

    /// Text label.
    Text {
        content: String,
        font: FontName,
        font_size: f32,
        line_height: Option<f32>,
        fill: Color,
    },
}

/// A single node. Coordinates are relative to the parent.
#[derive(Debug, Clone, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Plugin metadata: arbitrary string keys to string values.
    pub plugin_data: HashMap<String, String>,
}

impl SceneNode {
    pub fn new(id: NodeId, name: &str, kind: NodeKind, width: f32, height: f32) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            x: 0.0,
            y: 0.0,
            width,
            height,
            plugin_data: HashMap::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete document: one page tree, the selection, and host state.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    /// The underlying directed graph.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The page (root) node index.
    pub page: NodeIndex,

    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,

    /// Current selection, in selection order.
    pub selection: Vec<NodeId>,

    /// Centre of the visible viewport in page coordinates.
    pub viewport_center: (f32, f32),

    /// Fonts that cannot be loaded (not installed on this host).
    pub missing_fonts: HashSet<FontName>,

    /// Upper bound on the number of nodes below the page; creation past it
    /// is refused.
    pub node_limit: Option<usize>,

    loaded_fonts: HashSet<FontName>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    /// Create a new empty document with a page node.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let page_id = NodeId::with_prefix("0");
        let page = graph.add_node(SceneNode::new(page_id, "Page 1", NodeKind::Page, 0.0, 0.0));

        let mut id_index = HashMap::new();
        id_index.insert(page_id, page);

        Self {
            graph,
            page,
            id_index,
            selection: Vec::new(),
            viewport_center: (0.0, 0.0),
            missing_fonts: HashSet::new(),
            node_limit: None,
            loaded_fonts: HashSet::new(),
        }
    }

    /// Add a node as a child of `parent`. Returns the new node's index.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        idx
    }

    /// Remove a node and all its descendants, keeping `id_index` and the
    /// selection synchronized.
    pub fn remove_subtree(&mut self, idx: NodeIndex) {
        if idx == self.page {
            return;
        }
        let mut doomed = vec![idx];
        self.walk(idx, &mut doomed);
        for i in doomed {
            if let Some(removed) = self.graph.remove_node(i) {
                self.id_index.remove(&removed.id);
                self.selection.retain(|id| *id != removed.id);
            }
        }
    }

    /// Delete a node by id, as a user deleting it on the canvas would.
    pub fn delete(&mut self, id: NodeId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx != self.page => {
                self.remove_subtree(idx);
                true
            }
            _ => false,
        }
    }

    /// Look up a node by id.
    pub fn get_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up a node mutably by id.
    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Get the index for a NodeId.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Get the parent index of a node.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Reparent a node to a new parent.
    pub fn reparent_node(&mut self, child: NodeIndex, new_parent: NodeIndex) {
        if let Some(old_parent) = self.parent(child)
            && let Some(edge) = self.graph.find_edge(old_parent, child)
        {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(new_parent, child, ());
    }

    /// Get children of a node in document (insertion) order.
    ///
    /// Sorts by `NodeIndex` so the result is deterministic regardless of
    /// how `petgraph` iterates its adjacency list.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Depth-first pre-order walk below `idx` (excluding `idx`).
    fn walk(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        for child in self.children(idx) {
            out.push(child);
            self.walk(child, out);
        }
    }

    /// Number of nodes below the page.
    pub fn node_count(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_font_loaded(&self, font: &FontName) -> bool {
        self.loaded_fonts.contains(font)
    }

    /// Whether `extra` more nodes fit under `node_limit`.
    fn has_room(&self, extra: usize) -> bool {
        self.node_limit
            .is_none_or(|limit| self.node_count() + extra <= limit)
    }

    fn fresh_id() -> NodeId {
        NodeId::with_prefix(PAGE_PREFIX)
    }

    /// Lay out an auto-layout frame: children stacked along the layout axis
    /// after `padding`, separated by `item_spacing`. In a horizontal frame
    /// the last text child stretches to fill the remaining width; the
    /// frame's cross-axis size hugs its tallest child.
    fn relayout(&mut self, frame: NodeIndex) {
        let NodeKind::Frame {
            padding,
            item_spacing,
            layout,
            ..
        } = self.graph[frame].kind
        else {
            return;
        };
        let children = self.children(frame);
        let frame_width = self.graph[frame].width;

        match layout {
            LayoutMode::Horizontal => {
                let fixed: f32 = children
                    .iter()
                    .filter(|&&c| !self.graph[c].is_text())
                    .map(|&c| self.graph[c].width)
                    .sum();
                let gaps = item_spacing * children.len().saturating_sub(1) as f32;
                let fill = (frame_width - 2.0 * padding - fixed - gaps).max(0.0);

                let mut x = padding;
                let mut tallest: f32 = 0.0;
                for c in children {
                    let node = &mut self.graph[c];
                    if node.is_text() {
                        node.width = fill;
                    }
                    node.x = x;
                    node.y = padding;
                    x += node.width + item_spacing;
                    tallest = tallest.max(node.height);
                }
                self.graph[frame].height = tallest + 2.0 * padding;
            }
            LayoutMode::Vertical => {
                // Fixed-height wrapper: centre children on the vertical axis
                let height = self.graph[frame].height;
                let mut widest: f32 = 0.0;
                for c in children {
                    let node = &mut self.graph[c];
                    node.x = 0.0;
                    node.y = (height - node.height) / 2.0;
                    widest = widest.max(node.width);
                }
                self.graph[frame].width = widest;
            }
        }
    }
}

// ─── Host boundary ───────────────────────────────────────────────────────

impl MetadataStore for SceneDocument {
    fn scan(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.walk(self.page, &mut order);
        order.into_iter().map(|idx| self.graph[idx].id).collect()
    }

    fn exists(&self, node: NodeId) -> bool {
        self.id_index.contains_key(&node)
    }

    fn get_meta(&self, node: NodeId, key: &str) -> Option<&str> {
        self.get_by_id(node)?.plugin_data.get(key).map(String::as_str)
    }

    fn set_meta(&mut self, node: NodeId, key: &str, value: &str) {
        match self.get_by_id_mut(node) {
            Some(n) => {
                n.plugin_data.insert(key.to_string(), value.to_string());
            }
            None => log::warn!("set_meta on missing node {node}"),
        }
    }
}

impl Materializer for SceneDocument {
    fn load_font(&mut self, font: &FontName) -> Result<(), String> {
        if self.missing_fonts.contains(font) {
            return Err(format!(
                "The font \"{} {}\" could not be loaded",
                font.family, font.style
            ));
        }
        self.loaded_fonts.insert(font.clone());
        Ok(())
    }

    fn text_font(&self, node: NodeId) -> Option<FontName> {
        match &self.get_by_id(node)?.kind {
            NodeKind::Text { font, .. } => Some(font.clone()),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match &self.get_by_id(node)?.kind {
            NodeKind::Text { content, .. } => Some(content.clone()),
            _ => None,
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), String> {
        let font = self
            .text_font(node)
            .ok_or_else(|| format!("{node} is not a text node"))?;
        if !self.is_font_loaded(&font) {
            return Err(format!(
                "Cannot write to {node} before loading \"{} {}\"",
                font.family, font.style
            ));
        }
        if let Some(SceneNode {
            kind: NodeKind::Text { content, .. },
            ..
        }) = self.get_by_id_mut(node)
        {
            *content = text.to_string();
        }
        Ok(())
    }

    fn name(&self, node: NodeId) -> Option<String> {
        self.get_by_id(node).map(|n| n.name.clone())
    }

    fn set_name(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.get_by_id_mut(node) {
            n.name = name.to_string();
        }
    }

    fn create_badge(&mut self, spec: &BadgeSpec) -> Option<BuiltBadge> {
        if !self.has_room(3) || !self.is_font_loaded(&spec.font) {
            return None;
        }
        let style = spec.size.badge_style();
        let d = style.diameter;

        let group = self.add_node(
            self.page,
            SceneNode::new(Self::fresh_id(), &spec.name, NodeKind::Group, d, d),
        );
        self.add_node(
            group,
            SceneNode::new(
                Self::fresh_id(),
                "Badge Circle",
                NodeKind::Ellipse { fill: spec.color },
                d,
                d,
            ),
        );
        let label = self.add_node(
            group,
            SceneNode::new(
                Self::fresh_id(),
                "Badge Number",
                NodeKind::Text {
                    content: spec.label.clone(),
                    font: spec.font.clone(),
                    font_size: style.font_size,
                    line_height: None,
                    fill: Color::WHITE,
                },
                d,
                d,
            ),
        );
        Some(BuiltBadge {
            group: self.graph[group].id,
            label: self.graph[label].id,
        })
    }

    fn create_frame(&mut self, spec: &FrameSpec) -> Option<NodeId> {
        if !self.has_room(1) {
            return None;
        }
        let id = Self::fresh_id();
        let idx = self.add_node(
            self.page,
            SceneNode::new(
                id,
                &spec.name,
                NodeKind::Frame {
                    fill: Some(spec.fill),
                    corner_radius: spec.corner_radius,
                    padding: spec.padding,
                    item_spacing: spec.item_spacing,
                    layout: LayoutMode::Horizontal,
                },
                spec.width,
                2.0 * spec.padding,
            ),
        );
        self.relayout(idx);
        Some(id)
    }

    fn attach_badge(
        &mut self,
        frame: NodeId,
        badge: &BuiltBadge,
        line_height: f32,
    ) -> Option<NodeId> {
        let frame_idx = self.index_of(frame)?;
        let badge_idx = self.index_of(badge.group)?;
        if !self.has_room(1) {
            return None;
        }
        let badge_width = self.graph[badge_idx].width;
        let wrapper_id = Self::fresh_id();
        let wrapper = self.add_node(
            frame_idx,
            SceneNode::new(
                wrapper_id,
                "Badge Wrapper",
                NodeKind::Frame {
                    fill: None,
                    corner_radius: 0.0,
                    padding: 0.0,
                    item_spacing: 0.0,
                    layout: LayoutMode::Vertical,
                },
                badge_width,
                line_height,
            ),
        );
        self.reparent_node(badge_idx, wrapper);
        self.relayout(wrapper);
        self.relayout(frame_idx);
        Some(wrapper_id)
    }

    fn create_text(&mut self, parent: NodeId, spec: &TextSpec) -> Option<NodeId> {
        let parent_idx = self.index_of(parent)?;
        if !self.has_room(1) || !self.is_font_loaded(&spec.font) {
            return None;
        }
        let id = Self::fresh_id();
        self.add_node(
            parent_idx,
            SceneNode::new(
                id,
                &spec.name,
                NodeKind::Text {
                    content: spec.content.clone(),
                    font: spec.font.clone(),
                    font_size: spec.font_size,
                    line_height: Some(spec.line_height),
                    fill: spec.color,
                },
                0.0,
                spec.line_height,
            ),
        );
        self.relayout(parent_idx);
        Some(id)
    }

    fn remove(&mut self, node: NodeId) {
        self.delete(node);
    }

    fn center_on_viewport(&mut self, node: NodeId) {
        let (cx, cy) = self.viewport_center;
        if let Some(n) = self.get_by_id_mut(node) {
            n.x = cx - n.width / 2.0;
            n.y = cy - n.height / 2.0;
        }
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.index_of(node)
            .map(|idx| {
                self.children(idx)
                    .into_iter()
                    .map(|c| self.graph[c].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn first_text_descendant(&self, node: NodeId) -> Option<NodeId> {
        let idx = self.index_of(node)?;
        let mut order = Vec::new();
        self.walk(idx, &mut order);
        order
            .into_iter()
            .find(|&i| self.graph[i].is_text())
            .map(|i| self.graph[i].id)
    }
}

impl Host for SceneDocument {
    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn set_selection(&mut self, nodes: &[NodeId]) {
        self.selection = nodes
            .iter()
            .copied()
            .filter(|id| self.exists(*id))
            .collect();
    }
}
