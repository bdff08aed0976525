//! Plugin configuration.
//!
//! Every field has a default, so hosts can pass a partial JSON object (or
//! nothing at all) and override only what they need.

use serde::{Deserialize, Serialize};

/// A font family/style pair as the host names it, e.g. `Inter` / `Semi Bold`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: &str, style: &str) -> Self {
        Self {
            family: family.to_string(),
            style: style.to_string(),
        }
    }
}

/// How long status notifications stay on screen, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifyTimeouts {
    pub created: u32,
    pub renumbered: u32,
    pub unchanged: u32,
    pub error: u32,
    pub out_of_range: u32,
}

impl Default for NotifyTimeouts {
    fn default() -> Self {
        Self {
            created: 2000,
            renumbered: 2500,
            unchanged: 2000,
            error: 3000,
            out_of_range: 4000,
        }
    }
}

/// Configuration for a plugin session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Plugin window size requested from the host.
    pub ui_width: u32,
    pub ui_height: u32,

    pub timeouts: NotifyTimeouts,

    /// Font of every badge number label.
    pub badge_font: FontName,
    /// Font of the text block inside description frames.
    pub description_font: FontName,
    pub description_placeholder: String,

    /// Circle color of badges nested in description frames.
    pub frame_badge_color: String,
    pub description_text_color: String,

    pub badge_sequence_prefix: String,
    pub frame_sequence_prefix: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            ui_width: 280,
            ui_height: 420,
            timeouts: NotifyTimeouts::default(),
            badge_font: FontName::new("Inter", "Semi Bold"),
            description_font: FontName::new("Inter", "Medium"),
            description_placeholder: "Enter a description".to_string(),
            frame_badge_color: "#383838".to_string(),
            description_text_color: "#383838".to_string(),
            badge_sequence_prefix: "badge_seq".to_string(),
            frame_sequence_prefix: "desc_seq".to_string(),
        }
    }
}

impl PluginConfig {
    pub fn sequence_prefix(&self, kind: crate::model::ItemKind) -> &str {
        match kind {
            crate::model::ItemKind::Badge => &self.badge_sequence_prefix,
            crate::model::ItemKind::DescriptionFrame => &self.frame_sequence_prefix,
        }
    }
}
