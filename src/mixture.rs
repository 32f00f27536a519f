//! Combining two top-level items into a new mixture.

use crate::{
    enzymes::Enzymes,
    error::EngineError,
    ids::{IdCounter, ItemId},
    inventory::Inventory,
    item::{Attributes, Component, Item, Mixture},
    reaction::{Digestion, react, reconcile},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineOutcome {
    /// Replacement inventory, counter included.
    pub inventory: Inventory,
    pub mixture_id: ItemId,
    pub consumed_ids: [ItemId; 2],
    /// Every ID allocated by this combine, ascending; the mixture ID is last.
    pub created_ids: Vec<ItemId>,
    pub struck_ids: BTreeSet<ItemId>,
    pub digestions: Vec<Digestion>,
}

/// Wraps reconciled contents into a mixture with a freshly allocated ID.
pub fn build_mixture(
    contents: Vec<Component>,
    counter: IdCounter,
) -> Result<(Mixture, IdCounter), EngineError> {
    let (id, counter) = counter.allocate()?;
    Ok((
        Mixture {
            id,
            contents,
            extra: Attributes::new(),
        },
        counter,
    ))
}

fn find_operands(
    inventory: &Inventory,
    id1: ItemId,
    id2: ItemId,
) -> Result<(&Item, &Item), EngineError> {
    if id1 == id2 {
        return Err(EngineError::invalid_id(format!(
            "Cannot combine item {id1} with itself"
        )));
    }
    let lookup = |id: ItemId| {
        inventory
            .get(id)
            .ok_or_else(|| EngineError::invalid_id(format!("Item {id} not found in inventory")))
    };
    Ok((lookup(id1)?, lookup(id2)?))
}

/// Combines top-level items `id1` and `id2`.
///
/// Both operands are flattened into one pool, the pool is reacted and
/// reconciled, and the result becomes a new mixture appended after the
/// untouched items. Nothing is allocated when either ID is invalid.
pub fn combine(
    inventory: &Inventory,
    id1: ItemId,
    id2: ItemId,
    enzymes: &Enzymes,
) -> Result<CombineOutcome, EngineError> {
    let (first, second) = find_operands(inventory, id1, id2)?;

    let mut pool = first.flatten();
    pool.extend(second.flatten());
    debug!(
        "Combining #{id1} ({}) and #{id2} ({}) into a pool of {} item(s)",
        first.type_tag(),
        second.type_tag(),
        pool.len()
    );

    let start = inventory.next_id;
    let reaction = react(&pool, start, enzymes)?;
    let contents = reconcile(reaction.keep, &reaction.struck);
    let (mixture, counter) = build_mixture(contents, reaction.counter)?;
    let mixture_id = mixture.id;

    let mut items: Vec<Item> = inventory
        .items
        .iter()
        .filter(|item| item.id() != id1 && item.id() != id2)
        .cloned()
        .collect();
    items.push(Item::Mixture(mixture));

    let created_ids = (start.peek()..counter.peek()).collect();
    Ok(CombineOutcome {
        inventory: Inventory::new(counter, items),
        mixture_id,
        consumed_ids: [id1, id2],
        created_ids,
        struck_ids: reaction.struck,
        digestions: reaction.digestions,
    })
}
