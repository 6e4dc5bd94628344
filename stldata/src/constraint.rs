//! Logic-gate groups restricting which properties may co-occur.

use crate::kind::PropertyKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Combinator of a constraint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// Every member must be present. Compiled to singleton `Or` groups when
    /// added, so it never appears on a stored group.
    Required,
    /// At least one member must be present.
    Or,
    /// No member may be present.
    Nor,
}

impl Gate {
    /// Reads a logic-gate block key (`OR`, `NOR`, `NOT`, `AND`).
    pub fn from_script_key(key: &str) -> Option<Gate> {
        match key.to_ascii_lowercase().as_str() {
            "or" => Some(Gate::Or),
            "nor" | "not" => Some(Gate::Nor),
            "and" => Some(Gate::Required),
            _ => None,
        }
    }
}

/// One (kind, gate) rule over a set of property identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintGroup {
    pub gate: Gate,
    pub kind: PropertyKind,
    pub members: BTreeSet<String>,
}

impl ConstraintGroup {
    /// Whether a single candidate of `self.kind` passes this group on its own.
    pub fn admits(&self, identifier: &str) -> bool {
        match self.gate {
            Gate::Nor => !self.members.contains(identifier),
            Gate::Or | Gate::Required => self.members.contains(identifier),
        }
    }

    /// An `Or` over nothing can never pass.
    pub fn is_unsatisfiable(&self) -> bool {
        self.gate == Gate::Or && self.members.is_empty()
    }
}

/// The constraint groups of one property, keyed by the kind they restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    groups: BTreeMap<PropertyKind, Vec<ConstraintGroup>>,
}

impl Constraints {
    /// Adds a group, normalising as it goes.
    ///
    /// `Required` becomes one singleton `Or` per member. `Nor` members merge
    /// into the kind's existing `Nor` group. An `Or` identical to one already
    /// present is dropped. An empty `Or` is kept: it marks the property as
    /// impossible.
    pub fn add<I, S>(&mut self, gate: Gate, kind: PropertyKind, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: BTreeSet<String> = members.into_iter().map(Into::into).collect();
        match gate {
            Gate::Required => {
                for member in members {
                    self.add(Gate::Or, kind, [member]);
                }
            }
            Gate::Nor => {
                if members.is_empty() {
                    return;
                }
                let groups = self.groups.entry(kind).or_default();
                match groups.iter_mut().find(|g| g.gate == Gate::Nor) {
                    Some(existing) => existing.members.extend(members),
                    None => groups.push(ConstraintGroup { gate, kind, members }),
                }
            }
            Gate::Or => {
                let groups = self.groups.entry(kind).or_default();
                if !groups
                    .iter()
                    .any(|g| g.gate == Gate::Or && g.members == members)
                {
                    groups.push(ConstraintGroup { gate, kind, members });
                }
            }
        }
    }

    /// Groups restricting candidates of `kind`.
    pub fn of_kind(&self, kind: PropertyKind) -> &[ConstraintGroup] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintGroup> {
        self.groups.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// True when some group can never pass.
    pub fn is_unsatisfiable(&self) -> bool {
        self.iter().any(ConstraintGroup::is_unsatisfiable)
    }

    /// True if this property strictly requires `identifier`, i.e. carries the
    /// singleton `Or` group a `Required` reference compiles to.
    pub fn requires(&self, kind: PropertyKind, identifier: &str) -> bool {
        self.of_kind(kind).iter().any(|g| {
            g.gate == Gate::Or && g.members.len() == 1 && g.members.contains(identifier)
        })
    }

    /// True if this property's `Nor` groups exclude `identifier`.
    pub fn excludes(&self, kind: PropertyKind, identifier: &str) -> bool {
        self.of_kind(kind)
            .iter()
            .any(|g| g.gate == Gate::Nor && g.members.contains(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_keys() {
        assert_eq!(Gate::from_script_key("OR"), Some(Gate::Or));
        assert_eq!(Gate::from_script_key("NOR"), Some(Gate::Nor));
        assert_eq!(Gate::from_script_key("NOT"), Some(Gate::Nor));
        assert_eq!(Gate::from_script_key("AND"), Some(Gate::Required));
        assert_eq!(Gate::from_script_key("value"), None);
    }

    #[test]
    fn test_required_compiles_to_singleton_ors() {
        let mut c = Constraints::default();
        c.add(Gate::Required, PropertyKind::Ethics, ["ethic_a", "ethic_b"]);
        let groups = c.of_kind(PropertyKind::Ethics);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.gate == Gate::Or && g.members.len() == 1));
        assert!(c.requires(PropertyKind::Ethics, "ethic_a"));
        assert!(!c.requires(PropertyKind::Civics, "ethic_a"));
    }

    #[test]
    fn test_nor_groups_merge() {
        let mut c = Constraints::default();
        c.add(Gate::Nor, PropertyKind::Civics, ["civic_a"]);
        c.add(Gate::Nor, PropertyKind::Civics, ["civic_b"]);
        c.add(Gate::Nor, PropertyKind::Civics, Vec::<String>::new());
        assert_eq!(c.len(), 1);
        assert!(c.excludes(PropertyKind::Civics, "civic_a"));
        assert!(c.excludes(PropertyKind::Civics, "civic_b"));
    }

    #[test]
    fn test_or_groups_deduplicate() {
        let mut c = Constraints::default();
        c.add(Gate::Or, PropertyKind::Species, ["s1", "s2"]);
        c.add(Gate::Or, PropertyKind::Species, ["s2", "s1"]);
        c.add(Gate::Or, PropertyKind::Species, ["s1"]);
        assert_eq!(c.len(), 2);
        assert!(!c.is_unsatisfiable());
    }

    #[test]
    fn test_empty_or_is_unsatisfiable() {
        let mut c = Constraints::default();
        c.add(Gate::Or, PropertyKind::Authority, Vec::<String>::new());
        assert!(c.is_unsatisfiable());
        assert!(!c.of_kind(PropertyKind::Authority)[0].admits("auth_x"));
    }

    #[test]
    fn test_admits() {
        let nor = ConstraintGroup {
            gate: Gate::Nor,
            kind: PropertyKind::Trait,
            members: ["trait_b".to_string()].into(),
        };
        assert!(nor.admits("trait_a"));
        assert!(!nor.admits("trait_b"));
    }
}
