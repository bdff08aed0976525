//! The host boundary: what Badge Flow needs from the design tool.
//!
//! The host owns every node. Badge Flow only asks it to build nodes, edit
//! text and names, load fonts, and read/write node metadata (the
//! [`MetadataStore`] supertrait). [`crate::document::SceneDocument`] is the
//! in-memory implementation used by the WASM bridge and the tests.

use bf_core::model::{Color, SizeClass};
use bf_core::{FontName, MetadataStore, NodeId};

/// A badge to build: a filled circle with a centred number label, grouped
/// on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeSpec {
    pub name: String,
    pub label: String,
    pub size: SizeClass,
    pub color: Color,
    pub font: FontName,
}

/// Nodes produced for a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltBadge {
    pub group: NodeId,
    pub label: NodeId,
}

/// An empty description frame: horizontal auto-layout, fixed width,
/// height hugging its content.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub name: String,
    pub width: f32,
    pub padding: f32,
    pub item_spacing: f32,
    pub corner_radius: f32,
    pub fill: Color,
}

/// The text block of a description frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub name: String,
    pub content: String,
    pub font: FontName,
    pub font_size: f32,
    pub line_height: f32,
    pub color: Color,
}

/// Node construction and editing. Every method that builds a node returns
/// `None` when the host refuses; callers report that as a
/// materialization failure.
pub trait Materializer {
    /// Make `font` available for text edits.
    fn load_font(&mut self, font: &FontName) -> Result<(), String>;

    /// Font of a text node, `None` if the node is not text.
    fn text_font(&self, node: NodeId) -> Option<FontName>;

    fn text(&self, node: NodeId) -> Option<String>;

    /// Replace the characters of a text node. Fails when the node's font
    /// has not been loaded.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), String>;

    fn name(&self, node: NodeId) -> Option<String>;

    fn set_name(&mut self, node: NodeId, name: &str);

    fn create_badge(&mut self, spec: &BadgeSpec) -> Option<BuiltBadge>;

    fn create_frame(&mut self, spec: &FrameSpec) -> Option<NodeId>;

    /// Move `badge` into `frame`, wrapped so it sits centred on the first
    /// text line (`line_height` tall). Returns the wrapper.
    fn attach_badge(&mut self, frame: NodeId, badge: &BuiltBadge, line_height: f32)
    -> Option<NodeId>;

    /// Append a text node to `parent`, filling the remaining width.
    fn create_text(&mut self, parent: NodeId, spec: &TextSpec) -> Option<NodeId>;

    /// Delete a node and its subtree.
    fn remove(&mut self, node: NodeId);

    fn center_on_viewport(&mut self, node: NodeId);

    /// Direct children of `node` in document order.
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// First text node of `node`'s subtree in depth-first pre-order,
    /// children visited in document order.
    fn first_text_descendant(&self, node: NodeId) -> Option<NodeId>;
}

/// Everything a plugin session needs from its host.
pub trait Host: MetadataStore + Materializer {
    fn selection(&self) -> Vec<NodeId>;

    fn set_selection(&mut self, nodes: &[NodeId]);
}
