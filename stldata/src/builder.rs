//! Turns `potential`/`possible` blocks into constraint groups and adds the
//! relations implied by the game rules rather than written in the scripts.

use crate::constraint::{Constraints, Gate};
use crate::extract::ExtractionError;
use crate::kind::PropertyKind;
use crate::property::{Details, Property};
use crate::quotas::Quotas;
use crate::set::EthicVariants;
use std::collections::{BTreeSet, HashMap, HashSet};
use stltxt::Node;

/// Identifier to kind, for resolving references.
type KindIndex = HashMap<String, PropertyKind>;

/// Builds constraints for every property and filters out the ones that can
/// never be chosen.
///
/// Species go first so that traits can be checked against the species that
/// survived.
pub(crate) fn build(
    properties: Vec<Property>,
    quotas: &Quotas,
    diagnostics: &mut Vec<ExtractionError>,
) -> (Vec<Property>, EthicVariants) {
    let properties: Vec<Property> = properties
        .into_iter()
        .filter(|p| !never_available(p))
        .collect();
    let index: KindIndex = properties
        .iter()
        .map(|p| (p.identifier.clone(), p.kind()))
        .collect();
    let ethics: Vec<(String, i32, Option<String>)> = properties
        .iter()
        .filter_map(|p| {
            p.ethic()
                .map(|e| (p.identifier.clone(), p.cost, e.category.clone()))
        })
        .collect();

    let (species, others): (Vec<Property>, Vec<Property>) = properties
        .into_iter()
        .partition(|p| p.kind() == PropertyKind::Species);

    let mut kept = Vec::new();
    for mut property in species {
        if scripted_constraints(&mut property, &index, diagnostics) {
            kept.push(property);
        }
    }
    let live_species: Vec<(String, String)> = kept
        .iter()
        .filter_map(|p| {
            p.species()
                .map(|s| (p.identifier.clone(), s.archetype.clone()))
        })
        .collect();

    for mut property in others {
        if !scripted_constraints(&mut property, &index, diagnostics) {
            continue;
        }
        let usable = match property.kind() {
            PropertyKind::Ethics => {
                ethic_exclusions(&mut property, &ethics, quotas);
                true
            }
            PropertyKind::Trait => trait_relations(&mut property, &index, &live_species),
            _ => true,
        };
        if usable {
            kept.push(property);
        }
    }

    let variants = link_ethic_variants(&kept, diagnostics);
    (kept, variants)
}

/// True for an `always = no` anywhere under `potential` or directly in
/// `possible`.
fn never_available(property: &Property) -> bool {
    let Some(source) = property.source.as_ref() else {
        return false;
    };
    let never = source
        .child("potential")
        .is_some_and(|p| p.descendants().any(|n| n.is_pair("always", "no")))
        || source
            .child("possible")
            .is_some_and(|p| p.contains_pair("always", "no"));
    if never {
        log::debug!("{} is never available (always = no)", property.identifier);
    }
    never
}

/// Reads the property's own `potential`/`possible` blocks. Returns false if
/// the property can never be chosen.
fn scripted_constraints(
    property: &mut Property,
    index: &KindIndex,
    diagnostics: &mut Vec<ExtractionError>,
) -> bool {
    let Some(source) = property.source.as_ref() else {
        return true;
    };
    let potential = source.child("potential");
    let possible = source.child("possible");

    let mut constraints = Constraints::default();
    for section in [potential, possible].into_iter().flatten() {
        for entry in section.children() {
            let Some(kind) = PropertyKind::from_script_key(&entry.key) else {
                continue;
            };
            add_references(&mut constraints, &property.identifier, entry, kind, Gate::Required, index, diagnostics);
            for inner in entry.children() {
                if let Some(gate) = Gate::from_script_key(&inner.key) {
                    add_references(&mut constraints, &property.identifier, inner, kind, gate, index, diagnostics);
                }
            }
        }
    }

    if constraints.is_unsatisfiable() {
        log::debug!(
            "{} depends on properties that are not present, dropping it",
            property.identifier
        );
        return false;
    }
    property.constraints = constraints;
    true
}

/// Adds the `value = x` references directly under `node` as one group.
///
/// A reference to anything that is not a property of `kind` is unresolved: it
/// fails its `Required` slot outright and drops out of `Or`/`Nor` groups, so
/// an `Or` left with no members fails too.
#[allow(clippy::too_many_arguments)]
fn add_references(
    constraints: &mut Constraints,
    owner: &str,
    node: &Node,
    kind: PropertyKind,
    gate: Gate,
    index: &KindIndex,
    diagnostics: &mut Vec<ExtractionError>,
) {
    let values: Vec<&str> = node
        .children_with_key("value")
        .filter_map(Node::text)
        .collect();
    if values.is_empty() {
        return;
    }

    let mut resolved = Vec::with_capacity(values.len());
    for value in values {
        if index.get(value) == Some(&kind) {
            resolved.push(value);
        } else {
            log::debug!("{}: unresolved {} reference {}", owner, kind, value);
            diagnostics.push(ExtractionError::UnresolvedValue {
                identifier: owner.to_string(),
                value: value.to_string(),
            });
            if gate == Gate::Required {
                constraints.add(Gate::Or, kind, Vec::<String>::new());
            }
        }
    }

    constraints.add(gate, kind, resolved);
}

/// Excludes ethics that would overflow the point budget together with this
/// one, or that share its category.
fn ethic_exclusions(property: &mut Property, ethics: &[(String, i32, Option<String>)], quotas: &Quotas) {
    let category = property.ethic().and_then(|e| e.category.clone());
    let excluded: Vec<&str> = ethics
        .iter()
        .filter(|(id, cost, other_category)| {
            *id != property.identifier
                && (property.cost + cost > quotas.max_ethic_points
                    || (category.is_some() && *other_category == category))
        })
        .map(|(id, _, _)| id.as_str())
        .collect();
    property.constraints.add(Gate::Nor, PropertyKind::Ethics, excluded);
}

/// Resolves opposites and the species whose archetype admits the trait.
/// Returns false if no live species can take it.
fn trait_relations(property: &mut Property, index: &KindIndex, live_species: &[(String, String)]) -> bool {
    let Details::Trait(details) = &mut property.details else {
        return true;
    };

    details
        .opposites
        .retain(|o| index.get(o) == Some(&PropertyKind::Trait));
    details.allowed_species = live_species
        .iter()
        .filter(|(_, archetype)| details.allowed_archetypes.contains(archetype))
        .map(|(id, _)| id.clone())
        .collect();

    if details.allowed_species.is_empty() {
        log::debug!(
            "{} fits no available species ({:?}), dropping it",
            property.identifier,
            details.allowed_archetypes
        );
        return false;
    }

    let opposites = details.opposites.clone();
    let allowed: BTreeSet<String> = details.allowed_species.clone();
    property.constraints.add(Gate::Nor, PropertyKind::Trait, opposites);
    property.constraints.add(Gate::Or, PropertyKind::Species, allowed);
    true
}

/// Pairs each regular ethic with the fanatic form it names.
fn link_ethic_variants(properties: &[Property], diagnostics: &mut Vec<ExtractionError>) -> EthicVariants {
    let live: HashSet<&str> = properties
        .iter()
        .filter(|p| p.kind() == PropertyKind::Ethics)
        .map(|p| p.identifier.as_str())
        .collect();

    let mut variants = EthicVariants::default();
    for property in properties {
        let Some(fanatic) = property.ethic().and_then(|e| e.fanatic_variant.as_deref()) else {
            continue;
        };
        if !live.contains(fanatic) {
            diagnostics.push(ExtractionError::UnresolvedValue {
                identifier: property.identifier.clone(),
                value: fanatic.to_string(),
            });
            continue;
        }
        if !variants.link(&property.identifier, fanatic) {
            log::debug!("{} is already paired, ignoring {}", property.identifier, fanatic);
        }
    }
    variants
}
