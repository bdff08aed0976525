//! Sequence discovery by scanning node metadata.
//!
//! No registry of sequences exists. Every call walks the document and keeps
//! the nodes tagged for the requested kind whose sequence id matches.

use crate::id::{NodeId, SequenceId};
use crate::meta::{self, MetadataStore};
use crate::model::{Item, ItemKind};

/// Items of `(kind, sequence)` sorted ascending by number.
///
/// Nodes with a missing, non-numeric, or non-positive number are skipped.
/// Items sharing a number keep document order.
pub fn find_sequence<S: MetadataStore + ?Sized>(
    store: &S,
    kind: ItemKind,
    sequence: &SequenceId,
) -> Vec<Item> {
    let mut items: Vec<Item> = members(store, kind, sequence)
        .into_iter()
        .filter_map(|node| match meta::read_item(store, node, kind) {
            Ok(item) => Some(item),
            Err(err) => {
                log::debug!("skipping {node} in sequence {sequence}: {err}");
                None
            }
        })
        .collect();
    items.sort_by_key(|item| item.number);
    items
}

/// Next number to hand out in `(kind, sequence)`: `max(0, numbers...) + 1`.
///
/// Gaps left by deleted items are not reused.
pub fn next_number<S: MetadataStore + ?Sized>(
    store: &S,
    kind: ItemKind,
    sequence: &SequenceId,
) -> u32 {
    members(store, kind, sequence)
        .into_iter()
        .filter_map(|node| meta::read_number(store, node, kind).ok())
        .fold(0, u32::max)
        .saturating_add(1)
}

/// Every tagged node of `kind` whose stored sequence id equals `sequence`,
/// in document order, regardless of whether its number is usable.
pub fn members<S: MetadataStore + ?Sized>(
    store: &S,
    kind: ItemKind,
    sequence: &SequenceId,
) -> Vec<NodeId> {
    store
        .scan()
        .into_iter()
        .filter(|&node| {
            meta::is_item(store, node, kind)
                && meta::read_sequence(store, node, kind).as_ref() == Some(sequence)
        })
        .collect()
}

/// Whether the numbers of a sorted sequence are exactly `1..=len`.
pub fn is_contiguous(items: &[Item]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, item)| item.number as usize == i + 1)
}
