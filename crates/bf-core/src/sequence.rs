//! Choosing the sequence a newly created item joins.

use crate::id::{NodeId, SequenceId};
use crate::meta::{self, MetadataStore};
use crate::model::ItemKind;

/// Fresh, process-wide unique sequence id, e.g. `badge_seq_<ms>_<random>`.
pub fn new_sequence_id(prefix: &str) -> SequenceId {
    SequenceId::generate(prefix)
}

/// Sequence for an item about to be created.
///
/// When exactly one node is selected and it is an item of the same `kind`
/// with a stored sequence id, the new item extends that sequence. Anything
/// else (no selection, several nodes, another kind, an untagged node, a
/// tagged node with an empty id) starts a fresh sequence.
pub fn derive_sequence_id<S: MetadataStore + ?Sized>(
    store: &S,
    selection: &[NodeId],
    kind: ItemKind,
    prefix: &str,
) -> SequenceId {
    if let [node] = selection
        && meta::is_item(store, *node, kind)
        && let Some(sequence) = meta::read_sequence(store, *node, kind)
    {
        log::debug!("{kind} inherits sequence {sequence} from {node}");
        return sequence;
    }
    new_sequence_id(prefix)
}
