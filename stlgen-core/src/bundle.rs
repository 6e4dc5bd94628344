use crate::catalog::Catalog;
use crate::state::SearchNode;
use serde::Serialize;
use std::fmt;
use stldata::{Property, PropertyKind};

/// A complete empire: one selection for every slot.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle<'a> {
    pub authority: &'a Property,
    pub civics: Vec<&'a Property>,
    pub ethics: Vec<&'a Property>,
    pub origin: &'a Property,
    pub species: &'a Property,
    pub traits: Vec<&'a Property>,
}

impl<'a> Bundle<'a> {
    /// Reads the committed properties of a solved node, in commit order per slot.
    /// Returns `None` if a singleton slot is empty.
    pub fn from_solution(catalog: &Catalog<'a>, node: &SearchNode) -> Option<Self> {
        let of = |kind: PropertyKind| -> Vec<&'a Property> {
            node.solution
                .iter()
                .filter(|&&i| catalog.kind(i) == kind)
                .map(|&i| catalog.property(i))
                .collect()
        };
        Some(Bundle {
            authority: of(PropertyKind::Authority).first().copied()?,
            civics: of(PropertyKind::Civics),
            ethics: of(PropertyKind::Ethics),
            origin: of(PropertyKind::Origin).first().copied()?,
            species: of(PropertyKind::Species).first().copied()?,
            traits: of(PropertyKind::Trait),
        })
    }

    pub fn ethic_points(&self) -> i32 {
        self.ethics.iter().map(|p| p.cost).sum()
    }

    pub fn trait_points(&self) -> i32 {
        self.traits.iter().map(|p| p.cost).sum()
    }

    /// Every selected identifier, slot by slot.
    pub fn identifiers(&self) -> Vec<&'a str> {
        let mut out = vec![self.authority.identifier.as_str()];
        out.extend(self.civics.iter().map(|p| p.identifier.as_str()));
        out.extend(self.ethics.iter().map(|p| p.identifier.as_str()));
        out.push(self.origin.identifier.as_str());
        out.push(self.species.identifier.as_str());
        out.extend(self.traits.iter().map(|p| p.identifier.as_str()));
        out
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers().contains(&identifier)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, list: &[&Property]) -> fmt::Result {
    let ids: Vec<&str> = list.iter().map(|p| p.identifier.as_str()).collect();
    writeln!(f, "{:<10} {}", label, ids.join(", "))
}

impl fmt::Display for Bundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {}", "authority", self.authority.identifier)?;
        write_list(f, "civics", &self.civics)?;
        write_list(f, "ethics", &self.ethics)?;
        writeln!(f, "{:<10} {}", "origin", self.origin.identifier)?;
        writeln!(f, "{:<10} {}", "species", self.species.identifier)?;
        write_list(f, "traits", &self.traits)
    }
}
