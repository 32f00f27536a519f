//! Identifier allocation.
//!
//! The inventory document carries a single counter. It is threaded through
//! every operation as a plain value: each call consumes the current counter
//! and hands back the advanced one.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ItemId = u64;

pub const FIRST_ITEM_ID: ItemId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCounter(ItemId);

impl IdCounter {
    pub fn new(next: ItemId) -> Self {
        Self(next)
    }

    /// The ID the next allocation will hand out.
    pub fn peek(self) -> ItemId {
        self.0
    }

    /// Fails once the counter cannot advance past the current ID.
    pub fn allocate(self) -> Result<(ItemId, IdCounter), EngineError> {
        let next = self.0.checked_add(1).ok_or_else(|| {
            EngineError::invalid_input(format!("Item ID counter exhausted at {}", self.0))
        })?;
        Ok((self.0, IdCounter(next)))
    }

    /// Allocates `n` consecutive IDs in ascending order.
    pub fn allocate_many(self, n: usize) -> Result<(Vec<ItemId>, IdCounter), EngineError> {
        let mut counter = self;
        let mut ids = Vec::with_capacity(n);
        for _ in 0..n {
            let (id, next) = counter.allocate()?;
            ids.push(id);
            counter = next;
        }
        Ok((ids, counter))
    }

    /// Number of IDs handed out between `earlier` and `self`.
    pub fn allocated_since(self, earlier: IdCounter) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self(FIRST_ITEM_ID)
    }
}

impl fmt::Display for IdCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
