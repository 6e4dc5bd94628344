//! Classifies top-level definitions into properties and reads their
//! kind-specific fields.

use crate::builder;
use crate::kind::PropertyKind;
use crate::property::{Details, EthicDetails, Property, SpeciesDetails, TraitDetails};
use crate::quotas::Quotas;
use crate::set::PropertySet;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use stltxt::{Node, Value, from_node};
use thiserror::Error;

/// A definition that looked like a property but could not be read. The
/// property is dropped; the rest of the batch is unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("{identifier}: missing field '{field}'")]
    MissingField {
        identifier: String,
        field: &'static str,
    },
    #[error("{identifier}: '{field}' is not an integer: {value}")]
    NotAnInteger {
        identifier: String,
        field: &'static str,
        value: String,
    },
    #[error("{identifier}: archetype '{archetype}' cannot be resolved")]
    UnresolvedArchetype {
        identifier: String,
        archetype: String,
    },
    #[error("{identifier}: reference '{value}' does not resolve to a known property")]
    UnresolvedValue { identifier: String, value: String },
    #[error("{identifier}: cost must be at least 1, got {cost}")]
    NonPositiveCost { identifier: String, cost: i32 },
}

/// Result of extracting a property set from a combined tree.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub properties: PropertySet,
    /// Dropped definitions and unresolved references, in discovery order.
    pub diagnostics: Vec<ExtractionError>,
}

/// Extracts and constrains every property defined directly under `root`.
pub fn extract(root: &Node, quotas: &Quotas) -> Extraction {
    let mut diagnostics = Vec::new();
    let mut properties: Vec<Property> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for node in root.children() {
        let Some(kind) = classify(node) else {
            continue;
        };
        match extract_property(root, node, kind) {
            Ok(property) => match positions.get(&property.identifier) {
                Some(&i) => {
                    log::debug!(
                        "{} is defined again, the later definition replaces the earlier",
                        property.identifier
                    );
                    properties[i] = property;
                }
                None => {
                    positions.insert(property.identifier.clone(), properties.len());
                    properties.push(property);
                }
            },
            Err(e) => {
                log::warn!("Dropping definition: {}", e);
                diagnostics.push(e);
            }
        }
    }

    let extracted = properties.len();
    let (properties, variants) = builder::build(properties, quotas, &mut diagnostics);
    log::info!(
        "Extracted {} properties ({} usable after constraint building)",
        extracted,
        properties.len()
    );

    Extraction {
        properties: PropertySet::new(properties, variants),
        diagnostics,
    }
}

/// Decides which kind, if any, a top-level definition is. Predicates are
/// tried in a fixed order and the first match wins.
pub fn classify(node: &Node) -> Option<PropertyKind> {
    if is_ethic(node) {
        Some(PropertyKind::Ethics)
    } else if is_authority(node) {
        Some(PropertyKind::Authority)
    } else if is_origin(node) {
        Some(PropertyKind::Origin)
    } else if is_civic(node) {
        Some(PropertyKind::Civics)
    } else if is_trait(node) {
        Some(PropertyKind::Trait)
    } else if is_species(node) {
        Some(PropertyKind::Species)
    } else {
        None
    }
}

fn is_ethic(node: &Node) -> bool {
    node.key.starts_with("ethic_") && node.contains_key("cost")
}

/// AI-only authorities name `ai_empire` as a country type or under `potential`.
fn is_authority(node: &Node) -> bool {
    node.key.starts_with("auth_")
        && !node.paths(|n| n.is_pair("value", "ai_empire")).iter().any(|path| {
            let parent = path.len().checked_sub(2).map(|i| path[i]);
            parent.is_some_and(|p| p.key == "country_type")
                || path.iter().any(|ancestor| ancestor.key == "potential")
        })
}

fn is_origin(node: &Node) -> bool {
    node.descendants().any(|n| n.is_pair("is_origin", "yes")) && !unplayable(node)
}

fn is_civic(node: &Node) -> bool {
    node.key.starts_with("civic_") && !node.descendants().any(|n| n.key == "country_type")
}

fn is_trait(node: &Node) -> bool {
    node.key.starts_with("trait_")
        && node.contains_key("cost")
        && !node.contains_key("initial")
        && !node.contains_key("leader_trait")
}

fn is_species(node: &Node) -> bool {
    node.contains_key("archetype") && !unplayable(node)
}

/// `always = no` somewhere below a `playable` block.
fn unplayable(node: &Node) -> bool {
    always_no_under(node, "playable")
}

fn always_no_under(node: &Node, ancestor: &str) -> bool {
    node.paths(|n| n.is_pair("always", "no"))
        .iter()
        .any(|path| path.iter().any(|a| a.key == ancestor))
}

fn extract_property(root: &Node, node: &Node, kind: PropertyKind) -> Result<Property, ExtractionError> {
    let identifier = node.key.as_str();
    let (cost, details) = match kind {
        PropertyKind::Authority => (1, Details::Authority),
        PropertyKind::Civics => (1, Details::Civics),
        PropertyKind::Origin => (1, Details::Origin),
        PropertyKind::Ethics => {
            let cost = integer_field(root, node, "cost")?;
            if cost < 1 {
                return Err(ExtractionError::NonPositiveCost {
                    identifier: identifier.to_string(),
                    cost,
                });
            }
            let details = EthicDetails {
                category: node.child("category").and_then(Node::text).map(str::to_string),
                fanatic_variant: node
                    .child("fanatic_variant")
                    .and_then(Node::text)
                    .map(str::to_string),
            };
            (cost, Details::Ethics(details))
        }
        PropertyKind::Trait => {
            let cost = trait_cost(root, node)?;
            let details = TraitDetails {
                opposites: items(node, "opposites"),
                allowed_archetypes: items(node, "allowed_archetypes"),
                allowed_species: BTreeSet::new(),
            };
            (cost, Details::Trait(details))
        }
        PropertyKind::Species => (1, Details::Species(species_details(root, node)?)),
    };

    let mut property = Property::new(identifier, cost, details);
    property.source = Some(node.clone());
    Ok(property)
}

/// `cost = N`, or `cost = { base = N ... }` for traits with conditional costs.
fn trait_cost(root: &Node, node: &Node) -> Result<i32, ExtractionError> {
    let cost = node.child("cost").ok_or_else(|| missing(node, "cost"))?;
    match &cost.value {
        Value::Scalar(text) => resolve_integer(root, node, "cost", text),
        Value::Children(_) => integer_field(root, cost, "base").map_err(|e| rename(e, node)),
        Value::Set(_) => Err(missing(node, "cost")),
    }
}

/// Values of a `key = { a b }` set, or of a single `key = a`.
fn items(node: &Node, key: &str) -> BTreeSet<String> {
    node.children_with_key(key)
        .flat_map(|n| match &n.value {
            Value::Set(items) => items.iter().cloned().collect::<Vec<_>>(),
            Value::Scalar(text) => vec![text.clone()],
            Value::Children(_) => Vec::new(),
        })
        .collect()
}

/// Trait-point fields of an archetype definition.
#[derive(Debug, Default, Deserialize)]
struct ArchetypeDef {
    #[serde(default)]
    species_trait_points: Option<String>,
    #[serde(default)]
    species_max_traits: Option<String>,
    #[serde(default)]
    inherit_trait_points_from: Option<String>,
}

fn species_details(root: &Node, node: &Node) -> Result<SpeciesDetails, ExtractionError> {
    let identifier = node.key.as_str();
    let archetype = node
        .child("archetype")
        .and_then(Node::text)
        .ok_or_else(|| missing(node, "archetype"))?;

    let mut def = archetype_def(root, identifier, archetype)?;
    if let Some(parent) = def.inherit_trait_points_from.take() {
        def = archetype_def(root, identifier, &parent)?;
    }

    let trait_points = def
        .species_trait_points
        .as_deref()
        .ok_or_else(|| missing(node, "species_trait_points"))
        .and_then(|text| resolve_integer(root, node, "species_trait_points", text))?;
    let max_traits = def
        .species_max_traits
        .as_deref()
        .ok_or_else(|| missing(node, "species_max_traits"))
        .and_then(|text| resolve_integer(root, node, "species_max_traits", text))?;

    Ok(SpeciesDetails {
        archetype: archetype.to_string(),
        trait_points,
        max_traits,
        can_be_secondary: !always_no_under(node, "possible_secondary"),
    })
}

fn archetype_def(root: &Node, identifier: &str, archetype: &str) -> Result<ArchetypeDef, ExtractionError> {
    let unresolved = || ExtractionError::UnresolvedArchetype {
        identifier: identifier.to_string(),
        archetype: archetype.to_string(),
    };
    let node = root.child(archetype).filter(|n| n.is_block()).ok_or_else(unresolved)?;
    from_node(node).map_err(|e| {
        log::debug!("Archetype {} is malformed: {}", archetype, e);
        unresolved()
    })
}

fn integer_field(root: &Node, node: &Node, field: &'static str) -> Result<i32, ExtractionError> {
    let text = node
        .child(field)
        .and_then(Node::text)
        .ok_or_else(|| missing(node, field))?;
    resolve_integer(root, node, field, text)
}

/// Parses an integer, following one scripted-variable reference
/// (`@name`, defined at the top level) if the text is not a number.
fn resolve_integer(root: &Node, node: &Node, field: &'static str, text: &str) -> Result<i32, ExtractionError> {
    text.parse()
        .ok()
        .or_else(|| {
            root.child(text)
                .and_then(Node::text)
                .and_then(|v| v.parse().ok())
        })
        .ok_or_else(|| ExtractionError::NotAnInteger {
            identifier: node.key.clone(),
            field,
            value: text.to_string(),
        })
}

fn missing(node: &Node, field: &'static str) -> ExtractionError {
    ExtractionError::MissingField {
        identifier: node.key.clone(),
        field,
    }
}

/// Reattributes an error raised on a sub-block to the owning definition.
fn rename(error: ExtractionError, owner: &Node) -> ExtractionError {
    match error {
        ExtractionError::MissingField { field, .. } => ExtractionError::MissingField {
            identifier: owner.key.clone(),
            field,
        },
        ExtractionError::NotAnInteger { field, value, .. } => ExtractionError::NotAnInteger {
            identifier: owner.key.clone(),
            field,
            value,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stltxt::parse_document;

    fn root(text: &str) -> Node {
        Node::root(parse_document(text).unwrap())
    }

    fn kind_of(text: &str) -> Option<PropertyKind> {
        classify(&parse_document(text).unwrap()[0])
    }

    #[test]
    fn test_classify() {
        assert_eq!(kind_of("ethic_a = { cost = 1 }"), Some(PropertyKind::Ethics));
        assert_eq!(kind_of("ethic_a = { category = x }"), None);
        assert_eq!(kind_of("auth_x = { }"), Some(PropertyKind::Authority));
        assert_eq!(kind_of("civic_x = { }"), Some(PropertyKind::Civics));
        assert_eq!(kind_of("origin_y = { is_origin = yes }"), Some(PropertyKind::Origin));
        assert_eq!(kind_of("trait_a = { cost = 1 }"), Some(PropertyKind::Trait));
        assert_eq!(kind_of("species_z = { archetype = BIOLOGICAL }"), Some(PropertyKind::Species));
        assert_eq!(kind_of("BIOLOGICAL = { species_trait_points = 2 }"), None);
    }

    #[test]
    fn test_origin_wins_over_civic() {
        assert_eq!(
            kind_of("civic_origin = { is_origin = yes }"),
            Some(PropertyKind::Origin)
        );
    }

    #[test]
    fn test_ai_only_authority_is_not_a_property() {
        assert_eq!(
            kind_of("auth_ai = { potential = { country_type = { value = ai_empire } } }"),
            None
        );
        assert_eq!(
            kind_of("auth_ai = { country_type = { value = ai_empire } }"),
            None
        );
        assert_eq!(
            kind_of("auth_ok = { possible = { other = { value = ai_empire } } }"),
            Some(PropertyKind::Authority)
        );
    }

    #[test]
    fn test_excluded_shapes() {
        assert_eq!(kind_of("civic_fallen = { potential = { country_type = { value = fallen_empire } } }"), None);
        assert_eq!(kind_of("trait_leader = { cost = 1 leader_trait = yes }"), None);
        assert_eq!(kind_of("trait_start = { cost = 1 initial = no }"), None);
        assert_eq!(kind_of("species_x = { archetype = A playable = { always = no } }"), None);
        assert_eq!(kind_of("origin_x = { is_origin = yes playable = { always = no } }"), None);
    }

    #[test]
    fn test_species_through_archetype_table() {
        let root = root(
            r#"
            @base_points = 2
            BASE = { species_trait_points = @base_points species_max_traits = 5 }
            ROBOT = { inherit_trait_points_from = BASE species_trait_points = 9 }
            species_a = { archetype = ROBOT possible_secondary = { always = no } }
            "#,
        );
        let species = root.child("species_a").unwrap();
        let details = species_details(&root, species).unwrap();
        assert_eq!(details.trait_points, 2);
        assert_eq!(details.max_traits, 5);
        assert!(!details.can_be_secondary);
    }

    #[test]
    fn test_unresolved_archetype_drops_species() {
        let extraction = extract(
            &root("species_a = { archetype = NOWHERE } auth_x = { }"),
            &Quotas::default(),
        );
        assert_eq!(extraction.properties.len(), 1);
        assert_eq!(
            extraction.diagnostics,
            vec![ExtractionError::UnresolvedArchetype {
                identifier: "species_a".into(),
                archetype: "NOWHERE".into(),
            }]
        );
    }

    #[test]
    fn test_non_numeric_cost_drops_only_that_property() {
        let extraction = extract(
            &root("ethic_a = { cost = lots } ethic_b = { cost = 1 }"),
            &Quotas::default(),
        );
        assert!(extraction.properties.get("ethic_a").is_none());
        assert!(extraction.properties.get("ethic_b").is_some());
        assert!(matches!(
            extraction.diagnostics.as_slice(),
            [ExtractionError::NotAnInteger { field: "cost", .. }]
        ));
    }

    #[test]
    fn test_trait_fields() {
        let root = root(
            r#"
            trait_a = {
                cost = { base = -1 modifier = { add = 1 } }
                opposites = { trait_b trait_c }
                allowed_archetypes = { BIOLOGICAL }
            }
            "#,
        );
        let node = root.child("trait_a").unwrap();
        let property = extract_property(&root, node, PropertyKind::Trait).unwrap();
        assert_eq!(property.cost, -1);
        let details = property.trait_details().unwrap();
        assert_eq!(details.opposites.len(), 2);
        assert!(details.allowed_archetypes.contains("BIOLOGICAL"));
        assert!(property.source.is_some());
    }

    #[test]
    fn test_duplicate_identifier_later_wins() {
        let extraction = extract(
            &root("civic_a = { } auth_x = { } civic_a = { potential = { authority = { value = auth_x } } }"),
            &Quotas::default(),
        );
        let civic = extraction.properties.get("civic_a").unwrap();
        assert!(civic.constraints.requires(PropertyKind::Authority, "auth_x"));
    }
}
