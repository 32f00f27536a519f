use crate::{
    error::EngineError,
    ids::ItemId,
    item::{Attributes, Dna, Item, Reagent, RestrictionEnzyme},
};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_CATALOG_PATH: &str = "reagents.json";

/// Catalog entry for a reagent or an enzyme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTemplate {
    pub name: String,
    #[serde(flatten)]
    pub extra: Attributes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sequence: String,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// An orderable entry; it becomes an [`Item`] once it has an ID and a quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReagentTemplate {
    Reagent(NamedTemplate),
    #[serde(rename = "DNA")]
    Dna(DnaTemplate),
    RestrictionEnzyme(NamedTemplate),
}

// The ordered item sets these itself.
fn inherited(extra: &Attributes) -> Attributes {
    extra
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "ID" | "quantity"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl ReagentTemplate {
    /// Unnamed DNA entries cannot be ordered by name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Reagent(t) | Self::RestrictionEnzyme(t) => Some(&t.name),
            Self::Dna(t) => t.name.as_deref(),
        }
    }

    /// Copies the entry, extra attributes included, under a fresh ID.
    pub fn materialize(&self, id: ItemId, quantity: &str) -> Item {
        match self {
            Self::Reagent(t) => Item::Reagent(Reagent {
                id,
                name: t.name.clone(),
                quantity: quantity.to_string(),
                extra: inherited(&t.extra),
            }),
            Self::Dna(t) => Item::Dna(Dna {
                id,
                name: t.name.clone(),
                sequence: t.sequence.clone(),
                quantity: Some(quantity.to_string()),
                extra: inherited(&t.extra),
            }),
            Self::RestrictionEnzyme(t) => Item::RestrictionEnzyme(RestrictionEnzyme {
                id,
                name: t.name.clone(),
                quantity: Some(quantity.to_string()),
                extra: inherited(&t.extra),
            }),
        }
    }
}

/// Read-only list of orderable reagents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReagentCatalog {
    templates: Vec<ReagentTemplate>,
}

impl ReagentCatalog {
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text)
            .map_err(|e| EngineError::invalid_input(format!("Could not parse reagent catalog: {e}")))
    }

    pub fn from_json_file(path: &str) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::io(format!("Could not read reagent catalog '{path}': {e}"))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            EngineError::invalid_input(format!("Could not parse reagent catalog '{path}': {e}"))
        })
    }

    pub fn templates(&self) -> &[ReagentTemplate] {
        &self.templates
    }

    /// First template with exactly this name.
    pub fn find(&self, name: &str) -> Option<&ReagentTemplate> {
        self.templates.iter().find(|t| t.name() == Some(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().filter_map(ReagentTemplate::name).collect()
    }
}
