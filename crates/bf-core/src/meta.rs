//! Typed access to the string-valued metadata the host stores on nodes.
//!
//! The host keeps an arbitrary `key -> text` record per node with no schema
//! enforcement. Everything that decodes numbers, sequence ids, sizes, or
//! label references from that record goes through this module, so the
//! rules for what counts as corrupt live in one place.
//!
//! Record layout (all values are strings):
//!
//! | field | badge key | description frame key |
//! |-------|-----------|-----------------------|
//! | tag | `isBadgeFlowItem_v2` = `"true"` | `isDescFrameItem_v1` = `"true"` |
//! | number | `badgeNumber_v2` | `descFrameNumber_v1` |
//! | sequence | `badgeSequenceId_v2` | `descFrameSequenceId_v1` |
//! | size | — | `descFrameSizeType_v1` |
//! | label | `badgeLabelNode_v2` | `descFrameLabelNode_v1` |

use crate::error::{BfError, Result};
use crate::id::{NodeId, SequenceId};
use crate::model::{Item, ItemKind, SizeClass};

/// Per-node key/value storage provided by the host document.
///
/// Missing keys read as `None`. Implementations must return nodes from
/// `scan` in a stable document order.
pub trait MetadataStore {
    /// Every node on the current page, in document order.
    fn scan(&self) -> Vec<NodeId>;

    /// Whether `node` still exists in the document.
    fn exists(&self, node: NodeId) -> bool;

    fn get_meta(&self, node: NodeId, key: &str) -> Option<&str>;

    fn set_meta(&mut self, node: NodeId, key: &str, value: &str);
}

// ─── Schema ──────────────────────────────────────────────────────────────

/// Metadata keys for one item family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub item: &'static str,
    pub number: &'static str,
    pub sequence: &'static str,
    pub size: Option<&'static str>,
    pub label: &'static str,
}

pub const TAG_VALUE: &str = "true";

pub const BADGE_SCHEMA: Schema = Schema {
    item: "isBadgeFlowItem_v2",
    number: "badgeNumber_v2",
    sequence: "badgeSequenceId_v2",
    size: None,
    label: "badgeLabelNode_v2",
};

pub const DESCRIPTION_FRAME_SCHEMA: Schema = Schema {
    item: "isDescFrameItem_v1",
    number: "descFrameNumber_v1",
    sequence: "descFrameSequenceId_v1",
    size: Some("descFrameSizeType_v1"),
    label: "descFrameLabelNode_v1",
};

impl ItemKind {
    pub fn schema(self) -> &'static Schema {
        match self {
            ItemKind::Badge => &BADGE_SCHEMA,
            ItemKind::DescriptionFrame => &DESCRIPTION_FRAME_SCHEMA,
        }
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────

/// Why a stored number could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFault {
    Missing,
    NotANumber,
    NotPositive,
}

impl NumberFault {
    fn describe(self) -> &'static str {
        match self {
            NumberFault::Missing => "number is missing",
            NumberFault::NotANumber => "number is not numeric",
            NumberFault::NotPositive => "number is not positive",
        }
    }
}

/// Parse a decimal position. Surrounding whitespace and a leading `+` are
/// tolerated; anything else that is not a plain base-10 integer is not.
pub fn parse_number(raw: &str) -> std::result::Result<u32, NumberFault> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(NumberFault::Missing);
    }
    let (negative, digits) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NumberFault::NotANumber);
    }
    if negative {
        return Err(NumberFault::NotPositive);
    }
    match digits.parse::<u32>() {
        Ok(0) => Err(NumberFault::NotPositive),
        Ok(n) => Ok(n),
        // Only overflow is left at this point
        Err(_) => Err(NumberFault::NotANumber),
    }
}

/// Whether `node` carries the membership tag for `kind`.
pub fn is_item<S: MetadataStore + ?Sized>(store: &S, node: NodeId, kind: ItemKind) -> bool {
    store.get_meta(node, kind.schema().item) == Some(TAG_VALUE)
}

/// Stored number of a tagged node.
pub fn read_number<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> std::result::Result<u32, NumberFault> {
    store
        .get_meta(node, kind.schema().number)
        .map_or(Err(NumberFault::Missing), parse_number)
}

/// Stored sequence id, `None` when missing or empty.
pub fn read_sequence<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> Option<SequenceId> {
    store
        .get_meta(node, kind.schema().sequence)
        .map(SequenceId::from)
        .filter(|sequence| !sequence.is_empty())
}

/// Stored size class. Unknown values read as `None`: the size is
/// informational and never blocks renumbering.
pub fn read_size<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> Option<SizeClass> {
    let key = kind.schema().size?;
    store.get_meta(node, key)?.parse().ok()
}

/// Raw stored size string, passed through to the presentation layer as is.
pub fn read_size_raw<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> Option<&str> {
    let key = kind.schema().size?;
    store.get_meta(node, key)
}

/// Stored label reference, `None` when missing or pointing at a deleted node.
pub fn read_label<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> Option<NodeId> {
    store
        .get_meta(node, kind.schema().label)
        .filter(|s| !s.is_empty())
        .map(NodeId::intern)
        .filter(|label| store.exists(*label))
}

/// Decode a node into an [`Item`].
///
/// Fails with `ItemNotFound` if the node is gone or not tagged for `kind`,
/// and with `CorruptState` if its number is unusable.
pub fn read_item<S: MetadataStore + ?Sized>(
    store: &S,
    node: NodeId,
    kind: ItemKind,
) -> Result<Item> {
    if !store.exists(node) || !is_item(store, node, kind) {
        return Err(BfError::ItemNotFound { kind, id: node });
    }
    let number = read_number(store, node, kind).map_err(|fault| BfError::CorruptState {
        kind,
        message: format!("{} {node}: {}", kind, fault.describe()),
    })?;
    Ok(Item {
        node,
        kind,
        number,
        sequence_id: read_sequence(store, node, kind).unwrap_or_else(|| SequenceId::from("")),
        size: read_size(store, node, kind),
        label: read_label(store, node, kind),
    })
}

// ─── Encoding ────────────────────────────────────────────────────────────

/// Write the full record for a freshly materialized item.
pub fn write_item<S: MetadataStore + ?Sized>(store: &mut S, item: &Item) {
    let schema = item.kind.schema();
    store.set_meta(item.node, schema.item, TAG_VALUE);
    store.set_meta(item.node, schema.number, &item.number.to_string());
    store.set_meta(item.node, schema.sequence, item.sequence_id.as_str());
    if let (Some(key), Some(size)) = (schema.size, item.size) {
        store.set_meta(item.node, key, size.as_str());
    }
    if let Some(label) = item.label {
        store.set_meta(item.node, schema.label, label.as_str());
    }
}

pub fn write_number<S: MetadataStore + ?Sized>(
    store: &mut S,
    node: NodeId,
    kind: ItemKind,
    number: u32,
) {
    store.set_meta(node, kind.schema().number, &number.to_string());
}
