//! Item model for Badge Flow annotations.
//!
//! Two item families share one numbering model: bare badges and
//! description frames (a frame holding a badge and a text block). A
//! sequence is never stored; it is the set of items of one kind sharing a
//! sequence id, discovered by scanning node metadata.

use crate::error::BfError;
use crate::id::{NodeId, SequenceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque RGB color. Stored as 3 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string: `#RGB` or `#RRGGBB`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let (r, g, b) = match bytes.len() {
            3 => (
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            ),
            6 => (
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            ),
            _ => return None,
        };
        Some(Self::rgb(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ))
    }

    /// Parse a user-supplied color, rejecting anything but `#RGB` / `#RRGGBB`.
    pub fn parse(hex: &str) -> Result<Self, BfError> {
        Self::from_hex(hex.trim())
            .ok_or_else(|| BfError::InvalidInput(format!("invalid badge color `{hex}`")))
    }
}

// ─── Item kinds & sizes ──────────────────────────────────────────────────

/// The two parallel item families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Badge,
    DescriptionFrame,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Badge, ItemKind::DescriptionFrame];

    /// Wire name used in `itemType` fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Badge => "badge",
            ItemKind::DescriptionFrame => "descriptionFrame",
        }
    }

    /// Prefix used in generated node names.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ItemKind::Badge => "Badge",
            ItemKind::DescriptionFrame => "DescFrame",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemKind::Badge => "badge",
            ItemKind::DescriptionFrame => "description frame",
        })
    }
}

/// Size class shared by badge styles and description frame styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }

    /// Geometry of a badge drawn at this size.
    pub fn badge_style(self) -> BadgeStyle {
        match self {
            SizeClass::Large => BadgeStyle {
                diameter: 32.0,
                font_size: 18.0,
            },
            SizeClass::Medium => BadgeStyle {
                diameter: 24.0,
                font_size: 14.0,
            },
            SizeClass::Small => BadgeStyle {
                diameter: 18.0,
                font_size: 12.0,
            },
        }
    }

    /// Geometry of a description frame drawn at this size.
    pub fn frame_style(self) -> FrameStyle {
        match self {
            SizeClass::Large => FrameStyle {
                badge_size: SizeClass::Medium,
                width: 800.0,
                padding: 16.0,
                font_size: 18.0,
                line_height: 26.0,
            },
            SizeClass::Medium => FrameStyle {
                badge_size: SizeClass::Small,
                width: 480.0,
                padding: 16.0,
                font_size: 16.0,
                line_height: 24.0,
            },
            SizeClass::Small => FrameStyle {
                badge_size: SizeClass::Small,
                width: 360.0,
                padding: 12.0,
                font_size: 14.0,
                line_height: 20.0,
            },
        }
    }
}

impl FromStr for SizeClass {
    type Err = BfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            other => Err(BfError::InvalidInput(format!("invalid size `{other}`"))),
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circle diameter and label font size of a badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeStyle {
    pub diameter: f32,
    pub font_size: f32,
}

/// Layout of a description frame: nested badge size, fixed width, padding,
/// and text metrics. The badge is vertically centred on the first text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyle {
    pub badge_size: SizeClass,
    pub width: f32,
    pub padding: f32,
    pub font_size: f32,
    pub line_height: f32,
}

// ─── Items ───────────────────────────────────────────────────────────────

/// A decoded item: a host node tagged as a member of some sequence.
///
/// `label` is the text node showing the number. It is `None` only for
/// legacy items created without a stored label reference, or when the
/// referenced node was deleted; see `bf_editor::apply::resolve_label` for
/// the fallback rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub node: NodeId,
    pub kind: ItemKind,
    pub number: u32,
    pub sequence_id: SequenceId,
    pub size: Option<SizeClass>,
    pub label: Option<NodeId>,
}

impl Item {
    /// Node name for this item at `number`, e.g. `Badge (S:1718, N:3)`.
    pub fn name_for(&self, number: u32) -> String {
        item_name(self.kind, &self.sequence_id, number, self.size)
    }
}

/// Visible label text for a number.
pub fn label_text(number: u32) -> String {
    number.to_string()
}

/// Node name for an item: `Badge (S:<tag>, N:<n>)` or
/// `DescFrame (S:<tag>, N:<n>, Size:<size>)`.
pub fn item_name(
    kind: ItemKind,
    sequence: &SequenceId,
    number: u32,
    size: Option<SizeClass>,
) -> String {
    let tag = sequence.display_tag();
    match size {
        Some(size) => format!("{} (S:{tag}, N:{number}, Size:{size})", kind.name_prefix()),
        None => format!("{} (S:{tag}, N:{number})", kind.name_prefix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_6() {
        let c = Color::from_hex("#FF0000").unwrap();
        assert!((c.r - 1.0).abs() < 0.01);
        assert!(c.g.abs() < 0.01);
        assert!(c.b.abs() < 0.01);
    }

    #[test]
    fn parse_hex_3_without_hash() {
        let c = Color::from_hex("383").unwrap();
        assert!((c.r - 0x33 as f32 / 255.0).abs() < 0.001);
        assert!((c.g - 0x88 as f32 / 255.0).abs() < 0.001);
    }

    #[test]
    fn parse_hex_rejects_other_lengths() {
        assert!(Color::from_hex("#FF000080").is_none());
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GGHHII").is_none());
        assert!(matches!(Color::parse("red"), Err(BfError::InvalidInput(_))));
    }

    #[test]
    fn size_class_parses_wire_names() {
        assert_eq!("large".parse::<SizeClass>().unwrap(), SizeClass::Large);
        assert!("huge".parse::<SizeClass>().is_err());
        assert!("Large".parse::<SizeClass>().is_err());
    }

    #[test]
    fn frame_styles_nest_smaller_badges() {
        assert_eq!(SizeClass::Large.frame_style().badge_size, SizeClass::Medium);
        assert_eq!(SizeClass::Small.frame_style().badge_size, SizeClass::Small);
        assert_eq!(SizeClass::Medium.badge_style().diameter, 24.0);
    }

    #[test]
    fn names_include_size_for_frames() {
        let seq = SequenceId::from("desc_seq_1718000000000_abc");
        assert_eq!(
            item_name(ItemKind::DescriptionFrame, &seq, 2, Some(SizeClass::Small)),
            "DescFrame (S:1718, N:2, Size:small)"
        );
        assert_eq!(
            item_name(ItemKind::Badge, &seq, 9, None),
            "Badge (S:1718, N:9)"
        );
    }
}
