use crate::constraint::Constraints;
use crate::kind::PropertyKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use stltxt::Node;

/// One selectable empire building block.
///
/// Identity is the identifier alone: two properties with the same identifier
/// are equal regardless of their other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub identifier: String,
    /// Selection likelihood, treated as a repetition count.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Disabled properties never enter a generation run.
    #[serde(default = "default_allowed")]
    pub allowed: bool,
    /// Consumption against the kind's point budget. Negative for traits that
    /// give points back.
    pub cost: i32,
    pub details: Details,
    #[serde(default)]
    pub constraints: Constraints,
    /// Definition this property was read from.
    #[serde(skip)]
    pub source: Option<Node>,
}

fn default_weight() -> u32 {
    1
}

fn default_allowed() -> bool {
    true
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Details {
    Authority,
    Civics,
    Ethics(EthicDetails),
    Origin,
    Species(SpeciesDetails),
    Trait(TraitDetails),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicDetails {
    #[serde(default)]
    pub category: Option<String>,
    /// Identifier of the fanatic form, as written in the definition.
    #[serde(default)]
    pub fanatic_variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesDetails {
    pub archetype: String,
    /// Trait points the species may spend.
    pub trait_points: i32,
    /// Maximum number of traits the species may carry.
    pub max_traits: i32,
    pub can_be_secondary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDetails {
    pub opposites: BTreeSet<String>,
    pub allowed_archetypes: BTreeSet<String>,
    /// Species whose archetype admits this trait. Filled by the constraint builder.
    #[serde(default)]
    pub allowed_species: BTreeSet<String>,
}

impl Property {
    pub fn new(identifier: impl Into<String>, cost: i32, details: Details) -> Self {
        Property {
            identifier: identifier.into(),
            weight: default_weight(),
            allowed: default_allowed(),
            cost,
            details,
            constraints: Constraints::default(),
            source: None,
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self.details {
            Details::Authority => PropertyKind::Authority,
            Details::Civics => PropertyKind::Civics,
            Details::Ethics(_) => PropertyKind::Ethics,
            Details::Origin => PropertyKind::Origin,
            Details::Species(_) => PropertyKind::Species,
            Details::Trait(_) => PropertyKind::Trait,
        }
    }

    pub fn ethic(&self) -> Option<&EthicDetails> {
        match &self.details {
            Details::Ethics(e) => Some(e),
            _ => None,
        }
    }

    pub fn species(&self) -> Option<&SpeciesDetails> {
        match &self.details {
            Details::Species(s) => Some(s),
            _ => None,
        }
    }

    pub fn trait_details(&self) -> Option<&TraitDetails> {
        match &self.details {
            Details::Trait(t) => Some(t),
            _ => None,
        }
    }

    /// Key of the stable `kind, identifier` order.
    pub fn sort_key(&self) -> (PropertyKind, &str) {
        (self.kind(), &self.identifier)
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
