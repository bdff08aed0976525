//! Messages exchanged with the presentation layer.
//!
//! Inbound messages arrive as JSON objects tagged by `type`; outbound ones
//! are serialized the same way. Field names are camelCase on the wire.

use bf_core::{BfError, ItemKind, NodeId, Result, SequenceId};
use serde::{Deserialize, Serialize};

// ─── Inbound ─────────────────────────────────────────────────────────────

/// A request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessage {
    CreateBadge { options: CreateOptions },
    CreateDescriptionFrame { options: CreateOptions },
    UpdateBadgeNumber(UpdateNumber),
    UpdateDescriptionFrameNumber(UpdateNumber),
    Cancel,
}

/// Options block of a creation request. Only the block matching the
/// request is read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOptions {
    pub badge: Option<BadgeOptions>,
    pub description_frame: Option<FrameOptions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BadgeOptions {
    pub size: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameOptions {
    pub size: String,
}

/// Move one item of a sequence to a new number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNumber {
    #[serde(alias = "itemId")]
    pub badge_id: NodeId,
    pub sequence_id: SequenceId,
    pub new_number: NumberInput,
}

/// A number typed into a form: a JSON number or the raw field text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberInput {
    /// The integer the user asked for. Range checks are left to the
    /// renumber engine; only non-integers are rejected here.
    pub fn to_requested(&self) -> Result<i64> {
        match self {
            NumberInput::Int(n) => Ok(*n),
            NumberInput::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
            NumberInput::Float(f) => Err(BfError::InvalidInput(format!(
                "new number must be a whole number, got {f}"
            ))),
            NumberInput::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                BfError::InvalidInput(format!("new number must be a whole number, got `{s}`"))
            }),
        }
    }
}

impl UiMessage {
    /// Parse one inbound JSON message.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BfError::InvalidInput(format!("unrecognized message: {e}")))
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            UiMessage::CreateBadge { .. } => "create-badge",
            UiMessage::CreateDescriptionFrame { .. } => "create-description-frame",
            UiMessage::UpdateBadgeNumber(_) => "update-badge-number",
            UiMessage::UpdateDescriptionFrameNumber(_) => "update-description-frame-number",
            UiMessage::Cancel => "cancel",
        }
    }
}

// ─── Outbound ────────────────────────────────────────────────────────────

/// What the presentation layer is told about the selected item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItemInfo {
    pub id: NodeId,
    pub number: u32,
    pub sequence_id: SequenceId,
    pub item_type: ItemKind,
    /// Stored size class of a description frame, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// A message to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginMessage {
    SelectionChanged {
        #[serde(rename = "selectedItemInfo")]
        info: SelectedItemInfo,
    },
    DescFrameSelectionChanged {
        #[serde(rename = "selectedItemInfo")]
        info: SelectedItemInfo,
    },
    ClearSelection,
}

impl PluginMessage {
    /// Selection message for an item, typed by its kind.
    pub fn selected(info: SelectedItemInfo) -> Self {
        match info.item_type {
            ItemKind::Badge => PluginMessage::SelectionChanged { info },
            ItemKind::DescriptionFrame => PluginMessage::DescFrameSelectionChanged { info },
        }
    }

    pub fn info(&self) -> Option<&SelectedItemInfo> {
        match self {
            PluginMessage::SelectionChanged { info }
            | PluginMessage::DescFrameSelectionChanged { info } => Some(info),
            PluginMessage::ClearSelection => None,
        }
    }
}

/// Human-readable status toast. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub error: bool,
    /// Auto-dismiss delay in milliseconds; `None` stays until dismissed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

impl Notification {
    pub fn info(message: impl Into<String>, timeout: u32) -> Self {
        Self {
            message: message.into(),
            error: false,
            timeout: Some(timeout),
        }
    }

    pub fn error(message: impl Into<String>, timeout: u32) -> Self {
        Self {
            message: message.into(),
            error: true,
            timeout: Some(timeout),
        }
    }
}
