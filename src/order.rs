use crate::{
    catalog::ReagentCatalog,
    error::EngineError,
    ids::ItemId,
    inventory::Inventory,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub inventory: Inventory,
    pub item_id: ItemId,
}

/// Appends a fresh instance of the named catalog entry.
pub fn order(
    inventory: &Inventory,
    catalog: &ReagentCatalog,
    name: &str,
    quantity: &str,
) -> Result<OrderOutcome, EngineError> {
    let template = catalog
        .find(name)
        .ok_or_else(|| EngineError::not_found(format!("Reagent '{name}' is not in the catalog")))?;
    let (item_id, next_id) = inventory.next_id.allocate()?;
    let mut items = inventory.items.clone();
    items.push(template.materialize(item_id, quantity));
    Ok(OrderOutcome {
        inventory: Inventory::new(next_id, items),
        item_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, ids::IdCounter, item::Item};

    fn catalog() -> ReagentCatalog {
        ReagentCatalog::from_json_str(
            r#"[{"type": "RestrictionEnzyme", "name": "EcoR1"},
                {"type": "Reagent", "name": "Buffer"}]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_order_appends_with_next_id() {
        let inv = Inventory::default();
        let out = order(&inv, &catalog(), "EcoR1", "10 units").unwrap();
        assert_eq!(out.item_id, 1);
        assert_eq!(out.inventory.next_id.peek(), 2);
        assert!(matches!(
            out.inventory.items.as_slice(),
            [Item::RestrictionEnzyme(e)] if e.name == "EcoR1"
        ));

        let out = order(&out.inventory, &catalog(), "Buffer", "5 mL").unwrap();
        assert_eq!(out.item_id, 2);
        assert_eq!(out.inventory.len(), 2);
        assert_eq!(out.inventory.items[1].id(), 2);
    }

    #[test]
    fn test_order_unknown_reagent() {
        let inv = Inventory::new(IdCounter::new(5), vec![]);
        let err = order(&inv, &catalog(), "BamHI", "1 unit").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(inv.next_id.peek(), 5);
    }
}
