//! Inventory items.
//!
//! Items are serialized as tagged records, `{"type": "DNA", "ID": 4, ...}`.
//! A [`Mixture`] holds [`Component`]s, which have no mixture variant, so a
//! mixture is flat by construction and a nested mixture in stored JSON fails
//! to parse.
//!
//! Keys the model does not know about are kept in each record's `extra` map
//! and written back unchanged.

use crate::ids::ItemId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form attributes carried alongside the known fields of a record.
pub type Attributes = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reagent {
    #[serde(rename = "ID")]
    pub id: ItemId,
    pub name: String,
    pub quantity: String,
    #[serde(flatten)]
    pub extra: Attributes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dna {
    #[serde(rename = "ID")]
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Dna {
    /// A bare strand, as produced by a digest.
    pub fn fragment(id: ItemId, sequence: &str) -> Self {
        Self {
            id,
            name: None,
            sequence: sequence.to_string(),
            quantity: None,
            extra: Attributes::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    #[serde(rename = "ID")]
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixture {
    #[serde(rename = "ID")]
    pub id: ItemId,
    pub contents: Vec<Component>,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// Anything that can sit inside a mixture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    Reagent(Reagent),
    #[serde(rename = "DNA")]
    Dna(Dna),
    RestrictionEnzyme(RestrictionEnzyme),
}

impl Component {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Reagent(r) => r.id,
            Self::Dna(d) => d.id,
            Self::RestrictionEnzyme(e) => e.id,
        }
    }
}

/// A top-level inventory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    Reagent(Reagent),
    #[serde(rename = "DNA")]
    Dna(Dna),
    RestrictionEnzyme(RestrictionEnzyme),
    Mixture(Mixture),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Reagent(r) => r.id,
            Self::Dna(d) => d.id,
            Self::RestrictionEnzyme(e) => e.id,
            Self::Mixture(m) => m.id,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Reagent(_) => "Reagent",
            Self::Dna(_) => "DNA",
            Self::RestrictionEnzyme(_) => "RestrictionEnzyme",
            Self::Mixture(_) => "Mixture",
        }
    }

    /// Expands an item into its constituents, preserving order.
    ///
    /// A mixture yields its contents verbatim; anything else yields itself.
    pub fn flatten(&self) -> Vec<Component> {
        match self {
            Self::Mixture(m) => m.contents.clone(),
            Self::Reagent(r) => vec![Component::Reagent(r.clone())],
            Self::Dna(d) => vec![Component::Dna(d.clone())],
            Self::RestrictionEnzyme(e) => vec![Component::RestrictionEnzyme(e.clone())],
        }
    }

    pub fn as_mixture(&self) -> Option<&Mixture> {
        match self {
            Self::Mixture(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Component> for Item {
    fn from(component: Component) -> Self {
        match component {
            Component::Reagent(r) => Self::Reagent(r),
            Component::Dna(d) => Self::Dna(d),
            Component::RestrictionEnzyme(e) => Self::RestrictionEnzyme(e),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reagent(r) => write!(f, "#{} Reagent {} ({})", r.id, r.name, r.quantity),
            Self::Dna(d) => write!(f, "#{} DNA {}bp", d.id, d.len()),
            Self::RestrictionEnzyme(e) => write!(f, "#{} RestrictionEnzyme {}", e.id, e.name),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixture(m) => write!(f, "#{} Mixture of {} item(s)", m.id, m.contents.len()),
            Self::Reagent(r) => write!(f, "#{} Reagent {} ({})", r.id, r.name, r.quantity),
            Self::Dna(d) => write!(f, "#{} DNA {}bp", d.id, d.len()),
            Self::RestrictionEnzyme(e) => write!(f, "#{} RestrictionEnzyme {}", e.id, e.name),
        }
    }
}
