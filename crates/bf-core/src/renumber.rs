//! Renumber engine: move one item to a new position in its sequence.
//!
//! Planning is pure. [`plan_renumber`] reads the document, validates the
//! request completely, and returns the assignments; it never writes. The
//! caller applies the plan, so a rejected request leaves every number and
//! label untouched.
//!
//! Validation order (first failure wins):
//!
//! 1. requested number `>= 1`, else `InvalidInput`
//! 2. target is a tagged item of the expected kind, else `ItemNotFound`
//! 3. target's stored number is usable, else `CorruptState`
//! 4. requested == current is the `Unchanged` outcome, not an error
//! 5. sequence has items (`SequenceNotFound`) and includes the target (`CorruptState`)
//! 6. requested `<= N`, else `OutOfRange`

use crate::error::{BfError, Result};
use crate::id::{NodeId, SequenceId};
use crate::meta::{self, MetadataStore};
use crate::model::{Item, ItemKind};
use crate::query;

/// Final number for one item of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The item as read before the move; `item.number` is its current number.
    pub item: Item,
    pub number: u32,
}

impl Assignment {
    pub fn is_changed(&self) -> bool {
        self.item.number != self.number
    }
}

/// A validated move with an assignment for every item of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberPlan {
    pub target: Item,
    pub from: u32,
    pub to: u32,
    pub assignments: Vec<Assignment>,
}

impl RenumberPlan {
    /// Assignments whose number actually changes.
    pub fn changes(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(|a| a.is_changed())
    }

    /// Final number of `node`, if it belongs to the plan.
    pub fn number_of(&self, node: NodeId) -> Option<u32> {
        self.assignments
            .iter()
            .find(|a| a.item.node == node)
            .map(|a| a.number)
    }
}

/// Result of a successful renumber request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renumber {
    /// Requested number equals the current one; nothing to write.
    Unchanged { target: Item },
    /// The sequence must be rewritten as planned.
    Moved(RenumberPlan),
}

impl Renumber {
    pub fn target(&self) -> &Item {
        match self {
            Renumber::Unchanged { target } => target,
            Renumber::Moved(plan) => &plan.target,
        }
    }
}

/// Validate a move of `target` to `requested` within `(kind, sequence)` and
/// compute the new assignment of the whole sequence.
pub fn plan_renumber<S: MetadataStore + ?Sized>(
    store: &S,
    kind: ItemKind,
    sequence: &SequenceId,
    target: NodeId,
    requested: i64,
) -> Result<Renumber> {
    if requested < 1 {
        return Err(BfError::InvalidInput(format!(
            "new number must be at least 1, got {requested}"
        )));
    }
    let requested = requested as u64;

    let target_item = meta::read_item(store, target, kind)?;
    let current = target_item.number;

    if requested == u64::from(current) {
        return Ok(Renumber::Unchanged {
            target: target_item,
        });
    }

    let items = query::find_sequence(store, kind, sequence);
    if items.is_empty() {
        return Err(BfError::SequenceNotFound {
            kind,
            sequence: sequence.clone(),
        });
    }
    if !items.iter().any(|item| item.node == target) {
        return Err(BfError::CorruptState {
            kind,
            message: format!("{target} is not part of sequence {sequence}"),
        });
    }
    let len = items.len();
    let to = match u32::try_from(requested) {
        Ok(to) if to as usize <= len => to,
        _ => {
            return Err(BfError::OutOfRange {
                kind,
                requested,
                len,
            });
        }
    };

    log::debug!("renumber {kind} {target} in {sequence}: {current} -> {to} ({len} items)");
    let assignments = shift_and_insert(&items, target, current, to);
    Ok(Renumber::Moved(RenumberPlan {
        target: target_item,
        from: current,
        to,
        assignments,
    }))
}

/// Remove `target` from slot `old` and reinsert it at slot `new`.
///
/// Moving up (`new < old`) pushes every other item in `new..old` one slot
/// later; moving down (`new > old`) pulls every other item in `old+1..=new`
/// one slot earlier. Items outside the span keep their numbers.
pub fn shift_and_insert(items: &[Item], target: NodeId, old: u32, new: u32) -> Vec<Assignment> {
    items
        .iter()
        .map(|item| {
            let n = item.number;
            let number = if item.node == target {
                new
            } else if new < old && (new..old).contains(&n) {
                n + 1
            } else if new > old && (old + 1..=new).contains(&n) {
                n - 1
            } else {
                n
            };
            Assignment {
                item: item.clone(),
                number,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items(n: u32) -> Vec<Item> {
        (1..=n)
            .map(|i| Item {
                node: NodeId::intern(&format!("shift:{i}")),
                kind: ItemKind::Badge,
                number: i,
                sequence_id: SequenceId::from("seq"),
                size: None,
                label: None,
            })
            .collect()
    }

    fn finals(assignments: &[Assignment]) -> Vec<u32> {
        assignments.iter().map(|a| a.number).collect()
    }

    #[test]
    fn moving_up_shifts_span_later() {
        let seq = items(4);
        let out = shift_and_insert(&seq, seq[3].node, 4, 2);
        assert_eq!(finals(&out), vec![1, 3, 4, 2]);
    }

    #[test]
    fn moving_down_shifts_span_earlier() {
        let seq = items(3);
        let out = shift_and_insert(&seq, seq[0].node, 1, 3);
        assert_eq!(finals(&out), vec![3, 1, 2]);
    }

    #[test]
    fn every_move_keeps_numbers_dense() {
        for n in 1..=6 {
            let seq = items(n);
            for old in 1..=n {
                for new in 1..=n {
                    let out = shift_and_insert(&seq, seq[old as usize - 1].node, old, new);
                    let mut got = finals(&out);
                    got.sort_unstable();
                    assert_eq!(got, (1..=n).collect::<Vec<_>>(), "n={n} {old}->{new}");
                }
            }
        }
    }

    #[test]
    fn items_outside_span_are_untouched() {
        let seq = items(6);
        let out = shift_and_insert(&seq, seq[1].node, 2, 4);
        let changed: Vec<u32> = out
            .iter()
            .filter(|a| a.is_changed())
            .map(|a| a.item.number)
            .collect();
        assert_eq!(changed, vec![2, 3, 4]);
    }
}
