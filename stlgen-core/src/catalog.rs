//! Index arena over the allowed properties of one generation run.
//!
//! The search works on `usize` indices in stable `kind, identifier` order.
//! Constraint members are resolved to indices once; members that are not in
//! the run (disallowed or unknown) are dropped, so an `Or` group may end up
//! empty and its owner can then never be chosen.

use std::collections::HashMap;
use stldata::{Gate, Property, PropertyKind, PropertySet};

/// A constraint group with members resolved to catalog indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub gate: Gate,
    pub kind: PropertyKind,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub property: &'a Property,
    pub kind: PropertyKind,
    pub weight: u64,
    /// Units of the kind's quota this property uses up.
    pub consumption: i32,
    pub groups: Vec<Group>,
    /// Properties that strictly require this one.
    pub required_by: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> Catalog<'a> {
    /// Takes the allowed properties of `set`.
    pub fn new(set: &'a PropertySet) -> Self {
        Self::from_properties(set.iter().filter(|p| p.allowed))
    }

    /// Builds a catalog from properties already in `kind, identifier` order.
    pub fn from_properties<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = &'a Property>,
    {
        let properties: Vec<&'a Property> = properties.into_iter().collect();
        let index: HashMap<&str, usize> = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.identifier.as_str(), i))
            .collect();

        let mut entries: Vec<Entry<'a>> = properties
            .iter()
            .map(|&property| {
                let kind = property.kind();
                let groups = property
                    .constraints
                    .iter()
                    .map(|g| Group {
                        gate: g.gate,
                        kind: g.kind,
                        members: g
                            .members
                            .iter()
                            .filter_map(|m| index.get(m.as_str()).copied())
                            .collect(),
                    })
                    .collect();
                Entry {
                    property,
                    kind,
                    weight: u64::from(property.weight.max(1)),
                    consumption: match kind {
                        PropertyKind::Ethics => property.cost,
                        _ => 1,
                    },
                    groups,
                    required_by: Vec::new(),
                }
            })
            .collect();

        for owner in 0..entries.len() {
            let required: Vec<usize> = entries[owner]
                .groups
                .iter()
                .filter(|g| g.gate == Gate::Or && g.members.len() == 1)
                .map(|g| g.members[0])
                .filter(|&m| m != owner)
                .collect();
            for member in required {
                if !entries[member].required_by.contains(&owner) {
                    entries[member].required_by.push(owner);
                }
            }
        }

        Catalog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> &Entry<'a> {
        &self.entries[index]
    }

    pub fn property(&self, index: usize) -> &'a Property {
        self.entries[index].property
    }

    pub fn kind(&self, index: usize) -> PropertyKind {
        self.entries[index].kind
    }

    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.property.identifier == identifier)
    }

    /// Members of the singleton `Or` groups of `index`, i.e. what it strictly requires.
    pub fn requirements(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.entries[index]
            .groups
            .iter()
            .filter(|g| g.gate == Gate::Or && g.members.len() == 1)
            .map(|g| g.members[0])
            .filter(move |&m| m != index)
    }
}
