//! Applying a renumber plan to the host document.
//!
//! Application happens in two phases. The preflight resolves every label
//! and loads every font a write will need; nothing is written if any of it
//! fails. The write phase then rewrites number, label, and name of each
//! changed item. Should the host still reject a label write, the items
//! already rewritten are restored, so callers observe all or nothing.

use crate::host::Host;
use bf_core::meta;
use bf_core::model::label_text;
use bf_core::{BfError, FontName, Item, ItemKind, NodeId, PluginConfig, RenumberPlan, Result};

/// One item's pending rewrite, with what is needed to undo it.
struct Rewrite<'a> {
    item: &'a Item,
    number: u32,
    label: Option<NodeId>,
    old_name: Option<String>,
}

/// Label node of an item: the stored reference when it still exists,
/// otherwise the first text node below the item.
///
/// A description frame's own text children hold the description, so for
/// frames only the nested badge is searched. `None` when it has no text.
pub fn resolve_label<H: Host + ?Sized>(host: &H, item: &Item) -> Option<NodeId> {
    if item.label.is_some() {
        return item.label;
    }
    match item.kind {
        ItemKind::Badge => host.first_text_descendant(item.node),
        ItemKind::DescriptionFrame => host
            .child_nodes(item.node)
            .into_iter()
            .filter(|&child| host.text(child).is_none())
            .find_map(|child| host.first_text_descendant(child)),
    }
}

/// Write every changed assignment of `plan`. Returns how many items were
/// rewritten.
pub fn apply_plan<H: Host + ?Sized>(
    host: &mut H,
    plan: &RenumberPlan,
    config: &PluginConfig,
) -> Result<usize> {
    let reader: &H = host;
    let rewrites: Vec<Rewrite<'_>> = plan
        .changes()
        .map(|a| {
            let host = reader;
            let label = resolve_label(host, &a.item);
            if label.is_none() {
                log::warn!(
                    "{} {} has no label node; only its metadata will change",
                    a.item.kind,
                    a.item.node
                );
            }
            Rewrite {
                item: &a.item,
                number: a.number,
                label,
                old_name: host.name(a.item.node),
            }
        })
        .collect();

    let mut fonts: Vec<FontName> = Vec::new();
    for label in rewrites.iter().filter_map(|r| r.label) {
        let font = host
            .text_font(label)
            .unwrap_or_else(|| config.badge_font.clone());
        if !fonts.contains(&font) {
            fonts.push(font);
        }
    }
    for font in &fonts {
        host.load_font(font).map_err(BfError::Host)?;
    }

    for (done, rewrite) in rewrites.iter().enumerate() {
        if let Some(label) = rewrite.label
            && let Err(err) = host.set_text(label, &label_text(rewrite.number))
        {
            log::error!("label write failed on {}: {err}; rolling back", rewrite.item.node);
            restore(host, &rewrites[..done]);
            return Err(BfError::Host(err));
        }
        meta::write_number(host, rewrite.item.node, rewrite.item.kind, rewrite.number);
        host.set_name(rewrite.item.node, &rewrite.item.name_for(rewrite.number));
    }

    log::info!(
        "{} {} moved {} -> {}, {} items rewritten",
        plan.target.kind,
        plan.target.node,
        plan.from,
        plan.to,
        rewrites.len()
    );
    Ok(rewrites.len())
}

/// Put completed rewrites back to the numbers they had before the plan.
fn restore<H: Host + ?Sized>(host: &mut H, done: &[Rewrite<'_>]) {
    for rewrite in done {
        let old = rewrite.item.number;
        meta::write_number(host, rewrite.item.node, rewrite.item.kind, old);
        if let Some(label) = rewrite.label
            && let Err(err) = host.set_text(label, &label_text(old))
        {
            log::error!("could not restore label of {}: {err}", rewrite.item.node);
        }
        if let Some(name) = &rewrite.old_name {
            host.set_name(rewrite.item.node, name);
        }
    }
}
