use crate::{
    error::EngineError,
    ids::{IdCounter, ItemId},
    item::Item,
};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, path::Path};
use tracing::info;

pub const DEFAULT_STATE_PATH: &str = "inventory.json";

/// The whole inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "cur_id")]
    pub next_id: IdCounter,
    #[serde(rename = "inventory", default)]
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn new(next_id: IdCounter, items: Vec<Item>) -> Self {
        Self { next_id, items }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text)
            .map_err(|e| EngineError::invalid_input(format!("Could not parse inventory JSON: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::internal(format!("Could not serialize inventory: {e}")))
    }

    pub fn load_from_path(path: &str) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::io(format!("Could not read inventory file '{path}': {e}")))?;
        serde_json::from_str(&text).map_err(|e| {
            EngineError::invalid_input(format!("Could not parse inventory JSON '{path}': {e}"))
        })
    }

    pub fn save_to_path(&self, path: &str) -> Result<(), EngineError> {
        let text = self.to_json_pretty()?;
        std::fs::write(path, text)
            .map_err(|e| EngineError::io(format!("Could not write inventory file '{path}': {e}")))
    }
}

/// Whole-document access to wherever the inventory lives.
pub trait InventoryStore {
    fn read(&self) -> Result<Inventory, EngineError>;
    fn write(&self, inventory: &Inventory) -> Result<(), EngineError>;
}

/// Inventory kept in a JSON file. A missing file reads as an empty inventory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl InventoryStore for JsonFileStore {
    fn read(&self) -> Result<Inventory, EngineError> {
        if Path::new(&self.path).exists() {
            Inventory::load_from_path(&self.path)
        } else {
            Ok(Inventory::default())
        }
    }

    fn write(&self, inventory: &Inventory) -> Result<(), EngineError> {
        inventory.save_to_path(&self.path)?;
        info!(
            "Wrote inventory with {} item(s), next ID {} to '{}'",
            inventory.len(),
            inventory.next_id,
            self.path
        );
        Ok(())
    }
}

/// Inventory held in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: RefCell<Inventory>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: RefCell::new(inventory),
            writes: RefCell::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    pub fn into_inner(self) -> Inventory {
        self.inventory.into_inner()
    }
}

impl InventoryStore for MemoryStore {
    fn read(&self) -> Result<Inventory, EngineError> {
        Ok(self.inventory.borrow().clone())
    }

    fn write(&self, inventory: &Inventory) -> Result<(), EngineError> {
        *self.inventory.borrow_mut() = inventory.clone();
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
