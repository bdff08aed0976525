//! Integration tests: sequence query → renumber planning → applied numbers.
//!
//! Exercises `bf-core` against a plain in-memory metadata store, applying
//! plans the way a host would (write every changed number) and checking the
//! resulting document.

use bf_core::meta::{self, BADGE_SCHEMA, DESCRIPTION_FRAME_SCHEMA, MetadataStore};
use bf_core::query::is_contiguous;
use bf_core::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

#[derive(Default)]
struct Doc {
    nodes: Vec<NodeId>,
    data: HashMap<NodeId, HashMap<String, String>>,
}

impl MetadataStore for Doc {
    fn scan(&self) -> Vec<NodeId> {
        self.nodes.clone()
    }

    fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    fn get_meta(&self, node: NodeId, key: &str) -> Option<&str> {
        self.data.get(&node)?.get(key).map(String::as_str)
    }

    fn set_meta(&mut self, node: NodeId, key: &str, value: &str) {
        self.data
            .entry(node)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }
}

impl Doc {
    fn node(&mut self) -> NodeId {
        let id = NodeId::with_prefix("seq");
        self.nodes.push(id);
        id
    }

    /// Tagged item with a raw (possibly corrupt) stored number.
    fn raw(&mut self, kind: ItemKind, seq: &str, number: &str) -> NodeId {
        let node = self.node();
        let schema = kind.schema();
        self.set_meta(node, schema.item, "true");
        self.set_meta(node, schema.number, number);
        self.set_meta(node, schema.sequence, seq);
        node
    }

    fn badge(&mut self, seq: &str, number: u32) -> NodeId {
        self.raw(ItemKind::Badge, seq, &number.to_string())
    }

    fn numbers(&self, nodes: &[NodeId]) -> Vec<u32> {
        nodes
            .iter()
            .map(|&n| meta::read_number(self, n, ItemKind::Badge).unwrap())
            .collect()
    }

    fn apply(&mut self, outcome: &Renumber) {
        if let Renumber::Moved(plan) = outcome {
            for a in plan.changes() {
                meta::write_number(self, a.item.node, a.item.kind, a.number);
            }
        }
    }

    fn is_contiguous(&self, seq: &str) -> bool {
        is_contiguous(&find_sequence(self, ItemKind::Badge, &SequenceId::from(seq)))
    }

    fn sorted_numbers(&self, kind: ItemKind, seq: &str) -> Vec<u32> {
        find_sequence(self, kind, &SequenceId::from(seq))
            .iter()
            .map(|i| i.number)
            .collect()
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seq_of(doc: &mut Doc, seq: &str, n: u32) -> Vec<NodeId> {
    (1..=n).map(|i| doc.badge(seq, i)).collect()
}

fn renumber(doc: &Doc, seq: &str, target: NodeId, requested: i64) -> Result<Renumber> {
    plan_renumber(doc, ItemKind::Badge, &SequenceId::from(seq), target, requested)
}

// ─── Sequence query ──────────────────────────────────────────────────────

#[test]
fn find_sequence_sorts_and_filters() {
    init_logs();
    let mut doc = Doc::default();
    let c = doc.badge("s1", 3);
    let a = doc.badge("s1", 1);
    doc.badge("s2", 2);
    doc.raw(ItemKind::Badge, "s1", "");
    doc.raw(ItemKind::Badge, "s1", "zero");
    doc.raw(ItemKind::Badge, "s1", "0");
    doc.raw(ItemKind::DescriptionFrame, "s1", "2");
    let b = doc.badge("s1", 2);

    let items = find_sequence(&doc, ItemKind::Badge, &SequenceId::from("s1"));
    let nodes: Vec<NodeId> = items.iter().map(|i| i.node).collect();
    assert_eq!(nodes, vec![a, b, c]);
}

#[test]
fn next_number_is_max_plus_one() {
    let mut doc = Doc::default();
    assert_eq!(next_number(&doc, ItemKind::Badge, &SequenceId::from("s")), 1);

    doc.badge("s", 1);
    doc.badge("s", 4);
    doc.raw(ItemKind::Badge, "s", "garbage");
    assert_eq!(next_number(&doc, ItemKind::Badge, &SequenceId::from("s")), 5);
}

#[test]
fn next_number_ignores_all_invalid_entries() {
    let mut doc = Doc::default();
    doc.raw(ItemKind::Badge, "s", "-3");
    doc.raw(ItemKind::Badge, "s", "x");
    assert_eq!(next_number(&doc, ItemKind::Badge, &SequenceId::from("s")), 1);
}

#[test]
fn kinds_are_numbered_independently() {
    let mut doc = Doc::default();
    doc.badge("shared", 1);
    doc.badge("shared", 2);
    doc.raw(ItemKind::DescriptionFrame, "shared", "1");
    assert_eq!(next_number(&doc, ItemKind::Badge, &SequenceId::from("shared")), 3);
    assert_eq!(
        next_number(&doc, ItemKind::DescriptionFrame, &SequenceId::from("shared")),
        2
    );
}

// ─── Renumber scenarios ──────────────────────────────────────────────────

#[test]
fn move_last_to_second() {
    init_logs();
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 4);

    let outcome = renumber(&doc, "s", items[3], 2).unwrap();
    doc.apply(&outcome);
    assert_eq!(doc.numbers(&items), vec![1, 3, 4, 2]);
}

#[test]
fn move_first_to_last() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);

    let outcome = renumber(&doc, "s", items[0], 3).unwrap();
    doc.apply(&outcome);
    assert_eq!(doc.numbers(&items), vec![3, 1, 2]);
}

#[test]
fn move_and_back_restores_assignment() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 5);

    let there = renumber(&doc, "s", items[1], 4).unwrap();
    doc.apply(&there);
    assert_eq!(doc.numbers(&items), vec![1, 4, 2, 3, 5]);

    let back = renumber(&doc, "s", items[1], 2).unwrap();
    doc.apply(&back);
    assert_eq!(doc.numbers(&items), vec![1, 2, 3, 4, 5]);
}

#[test]
fn same_number_is_unchanged() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);

    let outcome = renumber(&doc, "s", items[1], 2).unwrap();
    assert!(matches!(outcome, Renumber::Unchanged { .. }));
    assert_eq!(outcome.target().node, items[1]);
    doc.apply(&outcome);
    assert_eq!(doc.numbers(&items), vec![1, 2, 3]);
}

#[test]
fn contiguity_holds_after_every_move() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 5);
    let moves = [(4, 1), (0, 5), (2, 3), (1, 1), (3, 4), (4, 2)];

    for (idx, to) in moves {
        let outcome = renumber(&doc, "s", items[idx], to).unwrap();
        doc.apply(&outcome);
        assert!(doc.is_contiguous("s"), "gap after moving {idx} to {to}");
        assert_eq!(doc.sorted_numbers(ItemKind::Badge, "s"), vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn other_sequences_are_untouched() {
    let mut doc = Doc::default();
    let a = seq_of(&mut doc, "a", 3);
    let b = seq_of(&mut doc, "b", 3);

    let outcome = renumber(&doc, "a", a[2], 1).unwrap();
    doc.apply(&outcome);
    assert_eq!(doc.numbers(&a), vec![2, 3, 1]);
    assert_eq!(doc.numbers(&b), vec![1, 2, 3]);
}

#[test]
fn plan_lists_whole_sequence_and_changes() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 5);

    let Renumber::Moved(plan) = renumber(&doc, "s", items[4], 3).unwrap() else {
        panic!("expected a move");
    };
    assert_eq!((plan.from, plan.to), (5, 3));
    assert_eq!(plan.assignments.len(), 5);
    let changed: Vec<NodeId> = plan.changes().map(|a| a.item.node).collect();
    assert_eq!(changed, vec![items[2], items[3], items[4]]);
    assert_eq!(plan.number_of(items[4]), Some(3));
}

// ─── Rejections ──────────────────────────────────────────────────────────

#[test]
fn zero_and_negative_are_invalid_input() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);
    for requested in [0, -1] {
        let err = renumber(&doc, "s", items[0], requested).unwrap_err();
        assert_eq!(err.code(), "invalid-input");
    }
}

#[test]
fn huge_request_is_out_of_range() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);
    let err = renumber(&doc, "s", items[0], 5_000_000_000).unwrap_err();
    assert_eq!(
        err,
        BfError::OutOfRange {
            kind: ItemKind::Badge,
            requested: 5_000_000_000,
            len: 3
        }
    );
    assert_eq!(doc.numbers(&items), vec![1, 2, 3]);
}

#[test]
fn huge_request_for_missing_target_is_not_found() {
    let doc = Doc::default();
    let err = renumber(&doc, "s", NodeId::intern("nowhere:2"), i64::MAX).unwrap_err();
    assert_eq!(err.code(), "item-not-found");
}

#[test]
fn invalid_input_wins_over_missing_target() {
    let doc = Doc::default();
    let err = renumber(&doc, "s", NodeId::intern("nowhere:1"), 0).unwrap_err();
    assert_eq!(err.code(), "invalid-input");
}

#[test]
fn past_the_end_is_out_of_range() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 4);
    let err = renumber(&doc, "s", items[0], 5).unwrap_err();
    assert_eq!(
        err,
        BfError::OutOfRange {
            kind: ItemKind::Badge,
            requested: 5,
            len: 4
        }
    );
    assert_eq!(doc.numbers(&items), vec![1, 2, 3, 4]);
}

#[test]
fn unknown_or_wrong_kind_target_is_not_found() {
    let mut doc = Doc::default();
    seq_of(&mut doc, "s", 2);
    let frame = doc.raw(ItemKind::DescriptionFrame, "s", "1");
    let plain = doc.node();

    for target in [NodeId::intern("nowhere:2"), frame, plain] {
        let err = renumber(&doc, "s", target, 1).unwrap_err();
        assert_eq!(err.code(), "item-not-found", "target {target}");
    }
}

#[test]
fn unreadable_target_number_is_corrupt() {
    let mut doc = Doc::default();
    seq_of(&mut doc, "s", 2);
    let broken = doc.raw(ItemKind::Badge, "s", "n/a");
    let err = renumber(&doc, "s", broken, 1).unwrap_err();
    assert_eq!(err.code(), "corrupt-state");
}

#[test]
fn empty_sequence_is_not_found() {
    let mut doc = Doc::default();
    let item = doc.badge("real", 1);
    let err = renumber(&doc, "ghost", item, 2).unwrap_err();
    assert_eq!(err.code(), "sequence-not-found");
}

#[test]
fn target_outside_requested_sequence_is_corrupt() {
    let mut doc = Doc::default();
    seq_of(&mut doc, "a", 3);
    let stray = doc.badge("b", 1);
    let err = renumber(&doc, "a", stray, 2).unwrap_err();
    assert_eq!(err.code(), "corrupt-state");
}

#[test]
fn corrupt_members_do_not_count_towards_length() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);
    doc.raw(ItemKind::Badge, "s", "oops");
    let err = renumber(&doc, "s", items[0], 4).unwrap_err();
    assert_eq!(err.code(), "out-of-range");
}

// ─── Deletion gaps (kept as observed behaviour) ─────────────────────────

#[test]
fn creation_after_deletion_does_not_reuse_gap() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 3);
    doc.nodes.retain(|&n| n != items[1]);
    assert!(!doc.is_contiguous("s"));
    assert_eq!(next_number(&doc, ItemKind::Badge, &SequenceId::from("s")), 4);
}

#[test]
fn moving_into_gap_closes_it() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "s", 4);
    // [1, 2, _, 4] once item 3 is deleted; N = 3
    doc.nodes.retain(|&n| n != items[2]);
    assert!(!doc.is_contiguous("s"));
    let outcome = renumber(&doc, "s", items[3], 3).unwrap();
    doc.apply(&outcome);
    assert!(doc.is_contiguous("s"));
    assert_eq!(doc.sorted_numbers(ItemKind::Badge, "s"), vec![1, 2, 3]);
}

// ─── Sequence inheritance ────────────────────────────────────────────────

#[test]
fn selected_item_passes_on_its_sequence() {
    let mut doc = Doc::default();
    let items = seq_of(&mut doc, "badge_seq_1_abc", 2);
    let seq = derive_sequence_id(&doc, &[items[0]], ItemKind::Badge, "badge_seq");
    assert_eq!(seq.as_str(), "badge_seq_1_abc");
    assert_eq!(next_number(&doc, ItemKind::Badge, &seq), 3);
}

#[test]
fn unrelated_selection_starts_fresh_sequence() {
    let mut doc = Doc::default();
    let badges = seq_of(&mut doc, "badge_seq_1_abc", 2);
    let frame = doc.raw(ItemKind::DescriptionFrame, "desc_seq_1_xyz", "1");
    let blank = doc.raw(ItemKind::Badge, "", "1");

    let selections: [&[NodeId]; 4] = [&[], badges.as_slice(), &[frame], &[blank]];
    for selection in selections {
        let seq = derive_sequence_id(&doc, selection, ItemKind::Badge, "badge_seq");
        assert!(seq.as_str().starts_with("badge_seq_"), "got {seq}");
        assert_ne!(seq.as_str(), "badge_seq_1_abc");
        assert_eq!(next_number(&doc, ItemKind::Badge, &seq), 1);
    }
}

#[test]
fn schemas_do_not_share_keys() {
    assert_ne!(BADGE_SCHEMA.item, DESCRIPTION_FRAME_SCHEMA.item);
    assert_ne!(BADGE_SCHEMA.number, DESCRIPTION_FRAME_SCHEMA.number);
    assert_ne!(BADGE_SCHEMA.sequence, DESCRIPTION_FRAME_SCHEMA.sequence);
    assert!(BADGE_SCHEMA.size.is_none());
}
