use labsim::{
    ENZYMES,
    catalog::ReagentCatalog,
    engine::{Engine, LabEngine, Operation, run_operation},
    error::ErrorCode,
    ids::{IdCounter, ItemId},
    inventory::{Inventory, InventoryStore, JsonFileStore},
    item::{Attributes, Component, Dna, Item, Mixture, Reagent, RestrictionEnzyme},
    mixture::combine,
};
use std::collections::HashSet;
use tempfile::tempdir;

fn enzyme(id: ItemId, name: &str) -> Item {
    Item::RestrictionEnzyme(RestrictionEnzyme {
        id,
        name: name.to_string(),
        quantity: None,
        extra: Attributes::new(),
    })
}

fn dna(id: ItemId, seq: &str) -> Item {
    Item::Dna(Dna::fragment(id, seq))
}

fn reagent(id: ItemId, name: &str) -> Item {
    Item::Reagent(Reagent {
        id,
        name: name.to_string(),
        quantity: "1 mL".to_string(),
        extra: Attributes::new(),
    })
}

fn bench() -> Inventory {
    Inventory::new(
        IdCounter::new(10),
        vec![
            reagent(1, "Buffer"),
            enzyme(2, "EcoR1"),
            dna(3, "AGAATTCTAGAATTCG"),
            dna(4, "TTTTGAATTCAAAA"),
            enzyme(5, "BamHI"),
            Item::Mixture(Mixture {
                id: 9,
                contents: vec![
                    Component::Dna(Dna::fragment(6, "CCGAATTCGG")),
                    Component::Reagent(Reagent {
                        id: 7,
                        name: "Salt".to_string(),
                        quantity: "2 g".to_string(),
                        extra: Attributes::new(),
                    }),
                ],
                extra: Attributes::new(),
            }),
        ],
    )
}

fn all_ids(inv: &Inventory) -> Vec<ItemId> {
    inv.items
        .iter()
        .flat_map(|item| {
            let mut ids = vec![item.id()];
            if let Item::Mixture(m) = item {
                ids.extend(m.contents.iter().map(Component::id));
            }
            ids
        })
        .collect()
}

#[test]
fn every_valid_pair_shrinks_inventory_by_one_and_counts_ids() {
    let inv = bench();
    let ids: Vec<ItemId> = inv.items.iter().map(Item::id).collect();
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let out = combine(&inv, a, b, &ENZYMES).unwrap();
            assert_eq!(out.inventory.len(), inv.len() - 1);
            let fragments: usize = out.digestions.iter().map(|d| d.fragment_ids.len()).sum();
            assert_eq!(
                out.inventory.next_id.allocated_since(inv.next_id),
                fragments as u64 + 1
            );
            assert_eq!(out.inventory.items.last().map(Item::id), Some(out.mixture_id));
            // untouched items keep their order
            let kept: Vec<&Item> = inv
                .items
                .iter()
                .filter(|item| item.id() != a && item.id() != b)
                .collect();
            let rest: Vec<&Item> = out.inventory.items.iter().take(kept.len()).collect();
            assert_eq!(kept, rest);
        }
    }
}

#[test]
fn created_ids_are_increasing_and_above_counter() {
    let inv = bench();
    let out = combine(&inv, 2, 9, &ENZYMES).unwrap();
    assert!(out.created_ids.windows(2).all(|w| w[0] < w[1]));
    assert!(out.created_ids.iter().all(|id| *id >= inv.next_id.peek()));
    assert_eq!(out.created_ids.last(), Some(&out.mixture_id));
}

#[test]
fn mixture_ids_are_distinct_and_struck_ids_are_gone() {
    let inv = bench();
    let out = combine(&inv, 2, 9, &ENZYMES).unwrap();
    let contents = &out
        .inventory
        .items
        .last()
        .and_then(Item::as_mixture)
        .unwrap()
        .contents;
    let unique: HashSet<ItemId> = contents.iter().map(Component::id).collect();
    assert_eq!(unique.len(), contents.len());
    assert_eq!(out.struck_ids.iter().copied().collect::<Vec<_>>(), vec![6]);
    assert!(!unique.contains(&6));
    assert!(unique.contains(&7));
    assert!(unique.contains(&2));
}

#[test]
fn ids_stay_globally_unique_across_a_session() {
    let mut inv = bench();
    for (a, b) in [(2, 3), (4, 5)] {
        inv = combine(&inv, a, b, &ENZYMES).unwrap().inventory;
    }
    let mixtures: Vec<ItemId> = inv
        .items
        .iter()
        .filter(|i| matches!(i, Item::Mixture(_)))
        .map(Item::id)
        .collect();
    let out = combine(&inv, mixtures[1], mixtures[2], &ENZYMES).unwrap();
    let ids = all_ids(&out.inventory);
    let unique: HashSet<ItemId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn invalid_id_leaves_file_store_byte_for_byte() {
    let td = tempdir().unwrap();
    let path = td.path().join("inventory.json");
    let store = JsonFileStore::new(path.to_string_lossy());
    store.write(&bench()).unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = run_operation(
        &store,
        &ReagentCatalog::default(),
        Operation::CombineItems { id1: 999, id2: 1 },
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidId);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn engine_snapshot_matches_pure_combine() {
    let inv = bench();
    let expected = combine(&inv, 1, 3, &ENZYMES).unwrap().inventory;
    let mut engine = LabEngine::from_state(inv, ReagentCatalog::default());
    engine
        .apply(Operation::CombineItems { id1: 1, id2: 3 })
        .unwrap();
    assert_eq!(engine.snapshot(), &expected);
}

#[test]
fn combine_keeps_unknown_keys_of_untouched_items() {
    let inv = Inventory::from_json_str(
        r#"{
            "cur_id": 4,
            "inventory": [
                {"type": "Reagent", "ID": 1, "name": "Buffer", "quantity": "5 mL", "concentration": "10x"},
                {"type": "RestrictionEnzyme", "ID": 2, "name": "EcoR1", "supplier": "NEB"},
                {"type": "DNA", "ID": 3, "sequence": "AGAATTCTAGAATTCG"}
            ]
        }"#,
    )
    .unwrap();
    let before = serde_json::to_value(&inv.items[0]).unwrap();
    let out = combine(&inv, 2, 3, &ENZYMES).unwrap();
    assert_eq!(serde_json::to_value(&out.inventory.items[0]).unwrap(), before);
    assert_eq!(before["concentration"], "10x");

    // the surviving enzyme carries its attributes into the mixture
    let mixture = out.inventory.get(out.mixture_id).and_then(Item::as_mixture).unwrap();
    let enzyme = serde_json::to_value(&mixture.contents[0]).unwrap();
    assert_eq!(enzyme["supplier"], "NEB");
}
