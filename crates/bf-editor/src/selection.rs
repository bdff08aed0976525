//! Selection bridge: describe the host selection to the presentation layer.

use crate::host::Host;
use crate::messages::{PluginMessage, SelectedItemInfo};
use bf_core::meta::{self, MetadataStore};
use bf_core::{ItemKind, NodeId};

/// Message for the current selection: item info when exactly one
/// recognized item is selected, `clear-selection` otherwise.
pub fn describe_selection<H: Host + ?Sized>(host: &H) -> PluginMessage {
    match host.selection().as_slice() {
        [node] => describe_node(host, *node),
        _ => PluginMessage::ClearSelection,
    }
}

/// Message for a single node.
///
/// Badge tags are checked before description frame tags. A tagged node
/// whose number or sequence id cannot be read is reported as
/// `clear-selection`, since the panel has nothing it could edit.
pub fn describe_node<S: MetadataStore + ?Sized>(store: &S, node: NodeId) -> PluginMessage {
    item_info(store, node)
        .map(PluginMessage::selected)
        .unwrap_or(PluginMessage::ClearSelection)
}

/// Selection info for a node, if it is a readable item.
pub fn item_info<S: MetadataStore + ?Sized>(store: &S, node: NodeId) -> Option<SelectedItemInfo> {
    if !store.exists(node) {
        return None;
    }
    let kind = ItemKind::ALL
        .into_iter()
        .find(|&kind| meta::is_item(store, node, kind))?;
    let number = meta::read_number(store, node, kind).ok()?;
    let sequence_id = meta::read_sequence(store, node, kind)?;
    Some(SelectedItemInfo {
        id: node,
        number,
        sequence_id,
        item_type: kind,
        size: meta::read_size_raw(store, node, kind).map(str::to_string),
    })
}
