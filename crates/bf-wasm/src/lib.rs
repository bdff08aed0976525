//! WASM bridge for Badge Flow — exposes the plugin session to the host page.
//!
//! Compiled via `wasm-pack build --target web`. Every call takes and returns
//! JSON strings so the panel can forward messages without knowing the Rust
//! types.

use bf_core::{NodeId, PluginConfig};
use bf_editor::document::NodeKind;
use bf_editor::{Host, PluginSession, Response, SceneDocument};
use petgraph::graph::NodeIndex;
use wasm_bindgen::prelude::*;

/// The plugin as seen from JavaScript.
///
/// Owns the document and the session. The page calls [`BfPlugin::post_message`]
/// with each panel message and forwards the returned messages and
/// notifications back to the panel.
#[wasm_bindgen]
pub struct BfPlugin {
    session: PluginSession<SceneDocument>,
}

#[wasm_bindgen]
impl BfPlugin {
    /// Create a plugin over an empty document. `config_json` may be empty
    /// for the built-in defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_setup();

        let config = if config_json.trim().is_empty() {
            PluginConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                log::warn!("ignoring invalid plugin config: {e}");
                PluginConfig::default()
            })
        };
        Self {
            session: PluginSession::new(SceneDocument::new(), config),
        }
    }

    /// Handle one panel message. Returns the [`Response`] as JSON.
    pub fn post_message(&mut self, json: &str) -> String {
        let response = self.session.handle_json(json);
        response_json(&response)
    }

    /// Replace the canvas selection with the ids in a JSON array, then
    /// describe the new selection. Unknown ids are dropped.
    pub fn set_selection(&mut self, ids_json: &str) -> String {
        let ids: Vec<String> = serde_json::from_str(ids_json).unwrap_or_else(|e| {
            log::warn!("selection is not a JSON string array: {e}");
            Vec::new()
        });
        let ids: Vec<NodeId> = ids.iter().map(|s| NodeId::intern(s)).collect();
        self.session.host_mut().set_selection(&ids);
        response_json(&self.session.selection_changed())
    }

    /// Currently selected node ids as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<&str> = self
            .session
            .host()
            .selection
            .iter()
            .map(|id| id.as_str())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Delete a node the way a user would on the canvas.
    /// Returns `true` if the node existed.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.session.host_mut().delete(NodeId::intern(node_id))
    }

    /// Where new items are centred.
    pub fn set_viewport_center(&mut self, x: f32, y: f32) {
        self.session.host_mut().viewport_center = (x, y);
    }

    /// Mark a font as unavailable on this host.
    pub fn mark_font_missing(&mut self, family: &str, style: &str) {
        self.session
            .host_mut()
            .missing_fonts
            .insert(bf_core::FontName::new(family, style));
    }

    /// Panel size as JSON `{"width":..,"height":..}`.
    pub fn ui_size(&self) -> String {
        let config = self.session.config();
        format!(
            r#"{{"width":{},"height":{}}}"#,
            config.ui_width, config.ui_height
        )
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// The document tree as JSON, for the layers preview.
    pub fn document_json(&self) -> String {
        let doc = self.session.host();
        let tree = collect_node_tree(doc, doc.page);
        serde_json::to_string(&tree).unwrap_or_else(|e| {
            log::error!("document serialization failed: {e}");
            "{}".to_string()
        })
    }
}

fn response_json(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        log::error!("response serialization failed: {e}");
        r#"{"messages":[],"notifications":[],"close":false}"#.to_string()
    })
}

/// Recursively collect nodes into a serializable tree structure.
fn collect_node_tree(doc: &SceneDocument, idx: NodeIndex) -> serde_json::Value {
    let node = &doc.graph[idx];
    let kind_str = match &node.kind {
        NodeKind::Page => "page",
        NodeKind::Group => "group",
        NodeKind::Frame { .. } => "frame",
        NodeKind::Ellipse { .. } => "ellipse",
        NodeKind::Text { .. } => "text",
    };
    let children: Vec<serde_json::Value> = doc
        .children(idx)
        .into_iter()
        .map(|child| collect_node_tree(doc, child))
        .collect();

    let mut obj = serde_json::json!({
        "id": node.id.as_str(),
        "name": node.name,
        "kind": kind_str,
    });
    if let NodeKind::Text { content, .. } = &node.kind {
        obj["text"] = serde_json::Value::String(content.clone());
    }
    if !node.plugin_data.is_empty() {
        obj["pluginData"] = serde_json::json!(node.plugin_data);
    }
    if !children.is_empty() {
        obj["children"] = serde_json::Value::Array(children);
    }
    obj
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SETUP: Once = Once::new();
        SETUP.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Badge Flow WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&console::LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};

    pub(super) static LOGGER: ConsoleLogger = ConsoleLogger;

    /// Routes `log` records to the browser console.
    pub(super) struct ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let msg: wasm_bindgen::JsValue = format!("[badge-flow] {}", record.args()).into();
            match record.level() {
                Level::Error => web_sys::console::error_1(&msg),
                Level::Warn => web_sys::console::warn_1(&msg),
                Level::Info => web_sys::console::info_1(&msg),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
            }
        }

        fn flush(&self) {}
    }
}
