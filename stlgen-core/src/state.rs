//! One snapshot of the generator's search.

use crate::catalog::Catalog;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use stldata::{PropertyKind, Quotas};

/// Narrows the candidate pool while its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// A trait was taken before any species: the species comes next.
    SpeciesNext,
    /// A species was taken: fill its traits before anything else.
    TraitsNext,
}

impl Restriction {
    pub fn applies(self, node: &SearchNode) -> bool {
        match self {
            Restriction::SpeciesNext => !node.has_species,
            Restriction::TraitsNext => node.has_species && !node.has_traits,
        }
    }

    pub fn admits(self, kind: PropertyKind) -> bool {
        match self {
            Restriction::SpeciesNext => kind == PropertyKind::Species,
            Restriction::TraitsNext => kind == PropertyKind::Trait,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    /// Committed properties in commit order.
    pub solution: Vec<usize>,
    /// Properties that may still be picked.
    pub remaining: BTreeSet<usize>,
    pub weight_sum: u64,
    pub has_authority: bool,
    pub civics_left: i32,
    pub ethic_points_left: i32,
    pub has_origin: bool,
    pub has_species: bool,
    /// Trait slots left; `-1` until a species is chosen.
    pub traits_left: i32,
    /// Trait points still to spend; only meaningful once a species is chosen.
    pub trait_balance: i32,
    pub has_traits: bool,
    /// Committed property to the indices of its `Or` groups not yet satisfied.
    pub pending: BTreeMap<usize, Vec<usize>>,
    pub restrictions: VecDeque<Restriction>,
    /// The pick that produced this node from its parent.
    pub origin_pick: Option<usize>,
}

impl SearchNode {
    pub fn root(catalog: &Catalog<'_>, quotas: &Quotas) -> Self {
        let remaining: BTreeSet<usize> = (0..catalog.len()).collect();
        let weight_sum = remaining.iter().map(|&i| catalog.entry(i).weight).sum();
        SearchNode {
            solution: Vec::new(),
            remaining,
            weight_sum,
            has_authority: false,
            civics_left: quotas.max_civics,
            ethic_points_left: quotas.max_ethic_points,
            has_origin: false,
            has_species: false,
            traits_left: -1,
            trait_balance: 0,
            has_traits: false,
            pending: BTreeMap::new(),
            restrictions: VecDeque::new(),
            origin_pick: None,
        }
    }

    pub fn is_committed(&self, index: usize) -> bool {
        self.solution.contains(&index)
    }

    /// Quota units of `kind` still available. `None` for traits before a
    /// species has been chosen.
    pub fn available(&self, kind: PropertyKind) -> Option<i32> {
        let flag = |done: bool| if done { 0 } else { 1 };
        match kind {
            PropertyKind::Authority => Some(flag(self.has_authority)),
            PropertyKind::Civics => Some(self.civics_left),
            PropertyKind::Ethics => Some(self.ethic_points_left),
            PropertyKind::Origin => Some(flag(self.has_origin)),
            PropertyKind::Species => Some(flag(self.has_species)),
            PropertyKind::Trait if !self.has_species => None,
            PropertyKind::Trait if self.has_traits => Some(0),
            PropertyKind::Trait => Some(self.traits_left),
        }
    }

    pub fn is_solution(&self) -> bool {
        self.has_authority
            && self.civics_left == 0
            && self.ethic_points_left == 0
            && self.has_origin
            && self.has_species
            && self.has_traits
            && self.trait_balance == 0
            && self.pending.values().all(Vec::is_empty)
    }

    /// The restriction governing the next pick. Restrictions whose condition
    /// no longer holds are dropped; the governing one stays queued.
    pub fn active_restriction(&mut self) -> Option<Restriction> {
        while let Some(&front) = self.restrictions.front() {
            if front.applies(self) {
                return Some(front);
            }
            self.restrictions.pop_front();
        }
        None
    }

    pub fn push_restriction(&mut self, restriction: Restriction) {
        if !self.restrictions.contains(&restriction) {
            self.restrictions.push_back(restriction);
        }
    }

    /// Removes `index` from the candidates. Returns false if it was not there.
    pub fn evict(&mut self, catalog: &Catalog<'_>, index: usize) -> bool {
        if self.remaining.remove(&index) {
            self.weight_sum -= catalog.entry(index).weight;
            true
        } else {
            false
        }
    }

    pub fn committed_of(&self, catalog: &Catalog<'_>, kind: PropertyKind) -> Vec<usize> {
        self.solution
            .iter()
            .copied()
            .filter(|&i| catalog.kind(i) == kind)
            .collect()
    }
}
