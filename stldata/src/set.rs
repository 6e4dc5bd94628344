use crate::cache::CacheError;
use crate::kind::PropertyKind;
use crate::property::Property;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Bidirectional regular/fanatic ethic lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicVariants {
    fanatic_by_regular: BTreeMap<String, String>,
    regular_by_fanatic: BTreeMap<String, String>,
}

impl EthicVariants {
    /// Links a pair. Returns false if either side is already linked.
    pub fn link(&mut self, regular: &str, fanatic: &str) -> bool {
        if regular == fanatic
            || self.fanatic_by_regular.contains_key(regular)
            || self.regular_by_fanatic.contains_key(fanatic)
        {
            return false;
        }
        self.fanatic_by_regular
            .insert(regular.to_string(), fanatic.to_string());
        self.regular_by_fanatic
            .insert(fanatic.to_string(), regular.to_string());
        true
    }

    pub fn fanatic_of(&self, regular: &str) -> Option<&str> {
        self.fanatic_by_regular.get(regular).map(String::as_str)
    }

    pub fn regular_of(&self, fanatic: &str) -> Option<&str> {
        self.regular_by_fanatic.get(fanatic).map(String::as_str)
    }

    pub fn is_fanatic(&self, identifier: &str) -> bool {
        self.regular_by_fanatic.contains_key(identifier)
    }

    /// `(regular, fanatic)` pairs in identifier order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fanatic_by_regular
            .iter()
            .map(|(r, f)| (r.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fanatic_by_regular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fanatic_by_regular.is_empty()
    }

    fn retain_known(&mut self, index: &HashMap<String, usize>) {
        self.fanatic_by_regular
            .retain(|r, f| index.contains_key(r) && index.contains_key(f));
        self.regular_by_fanatic
            .retain(|f, r| index.contains_key(r) && index.contains_key(f));
    }
}

/// Properties in stable `kind, identifier` order, with identifier lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "PropertySetData")]
pub struct PropertySet {
    properties: Vec<Property>,
    ethic_variants: EthicVariants,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct PropertySetData {
    properties: Vec<Property>,
    #[serde(default)]
    ethic_variants: EthicVariants,
}

impl From<PropertySetData> for PropertySet {
    fn from(data: PropertySetData) -> Self {
        PropertySet::new(data.properties, data.ethic_variants)
    }
}

impl PropertySet {
    /// Sorts and indexes `properties`. Later duplicates of an identifier
    /// replace earlier ones; variant pairs naming unknown ethics are dropped.
    pub fn new(properties: Vec<Property>, mut ethic_variants: EthicVariants) -> Self {
        let mut by_id: HashMap<String, Property> = HashMap::with_capacity(properties.len());
        for property in properties {
            by_id.insert(property.identifier.clone(), property);
        }
        let mut properties: Vec<Property> = by_id.into_values().collect();
        properties.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.identifier.clone(), i))
            .collect();
        ethic_variants.retain_known(&index);

        PropertySet {
            properties,
            ethic_variants,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    pub fn as_slice(&self) -> &[Property] {
        &self.properties
    }

    pub fn get(&self, identifier: &str) -> Option<&Property> {
        self.index.get(identifier).map(|&i| &self.properties[i])
    }

    /// Mutable access for the `weight`/`allowed` overrides.
    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Property> {
        self.index
            .get(identifier)
            .map(|&i| &mut self.properties[i])
    }

    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.index.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn of_kind(&self, kind: PropertyKind) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(move |p| p.kind() == kind)
    }

    pub fn ethic_variants(&self) -> &EthicVariants {
        &self.ethic_variants
    }

    /// Sets `allowed` on one property. Returns false for unknown identifiers.
    pub fn set_allowed(&mut self, identifier: &str, allowed: bool) -> bool {
        match self.get_mut(identifier) {
            Some(p) => {
                p.allowed = allowed;
                true
            }
            None => false,
        }
    }

    /// Sets `weight` on one property, clamped to at least 1.
    pub fn set_weight(&mut self, identifier: &str, weight: u32) -> bool {
        match self.get_mut(identifier) {
            Some(p) => {
                p.weight = weight.max(1);
                true
            }
            None => false,
        }
    }

    pub fn to_json(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Gate;
    use crate::property::{Details, EthicDetails};

    fn ethic(id: &str) -> Property {
        Property::new(id, 1, Details::Ethics(EthicDetails::default()))
    }

    #[test]
    fn test_sorted_by_kind_then_identifier() {
        let set = PropertySet::new(
            vec![
                Property::new("civic_b", 1, Details::Civics),
                ethic("ethic_a"),
                Property::new("civic_a", 1, Details::Civics),
                Property::new("auth_z", 1, Details::Authority),
            ],
            EthicVariants::default(),
        );
        let ids: Vec<_> = set.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["auth_z", "civic_a", "civic_b", "ethic_a"]);
        assert_eq!(set.position("civic_b"), Some(2));
        assert_eq!(set.of_kind(PropertyKind::Civics).count(), 2);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let set = PropertySet::new(
            vec![
                Property::new("civic_a", 1, Details::Civics),
                Property::new("civic_a", 7, Details::Civics),
            ],
            EthicVariants::default(),
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("civic_a").map(|p| p.cost), Some(7));
    }

    #[test]
    fn test_overrides() {
        let mut set = PropertySet::new(vec![ethic("ethic_a")], EthicVariants::default());
        assert!(set.set_allowed("ethic_a", false));
        assert!(set.set_weight("ethic_a", 0));
        assert!(!set.set_weight("ethic_missing", 3));
        let p = set.get("ethic_a").unwrap();
        assert!(!p.allowed);
        assert_eq!(p.weight, 1);
    }

    #[test]
    fn test_ethic_variants() {
        let mut v = EthicVariants::default();
        assert!(v.link("ethic_a", "ethic_fanatic_a"));
        assert!(!v.link("ethic_a", "ethic_fanatic_b"));
        assert_eq!(v.fanatic_of("ethic_a"), Some("ethic_fanatic_a"));
        assert_eq!(v.regular_of("ethic_fanatic_a"), Some("ethic_a"));
        assert!(v.is_fanatic("ethic_fanatic_a"));
        assert!(!v.is_fanatic("ethic_a"));

        let set = PropertySet::new(vec![ethic("ethic_a")], v);
        // fanatic form is not in the set
        assert!(set.ethic_variants().is_empty());
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let mut civic = Property::new("civic_a", 1, Details::Civics);
        civic
            .constraints
            .add(Gate::Nor, PropertyKind::Ethics, ["ethic_fanatic_a"]);
        let mut variants = EthicVariants::default();
        variants.link("ethic_a", "ethic_fanatic_a");
        let set = PropertySet::new(
            vec![civic, ethic("ethic_a"), ethic("ethic_fanatic_a")],
            variants,
        );

        let loaded = PropertySet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.position("ethic_a"), set.position("ethic_a"));
        assert_eq!(
            loaded.get("civic_a").unwrap().constraints,
            set.get("civic_a").unwrap().constraints
        );
        assert_eq!(loaded.ethic_variants(), set.ethic_variants());
    }
}
