//! Per-kind commit rules.
//!
//! Every check is made against the hypothetical solution that includes the
//! pick, so an `Or` group counts the pick itself and the quota left over
//! after it.

use crate::catalog::{Catalog, Group};
use crate::state::{Restriction, SearchNode};
use rand::Rng;
use std::collections::VecDeque;
use stldata::{Gate, PropertyKind};

/// Whether `pick` may be committed to `node` as it stands.
pub fn can_add(node: &SearchNode, catalog: &Catalog<'_>, pick: usize) -> bool {
    if node.is_committed(pick) || !kind_allows(node, catalog, pick) {
        return false;
    }

    let kind = catalog.kind(pick);
    let accepted_by_solution = node.solution.iter().all(|&owner| {
        catalog
            .entry(owner)
            .groups
            .iter()
            .filter(|g| g.kind == kind)
            .all(|g| group_viable(node, catalog, g, pick))
    });

    accepted_by_solution
        && catalog
            .entry(pick)
            .groups
            .iter()
            .all(|g| group_viable(node, catalog, g, pick))
}

fn kind_allows(node: &SearchNode, catalog: &Catalog<'_>, pick: usize) -> bool {
    let entry = catalog.entry(pick);
    match entry.kind {
        PropertyKind::Authority => !node.has_authority,
        PropertyKind::Civics => node.civics_left >= 1,
        PropertyKind::Ethics => entry.consumption <= node.ethic_points_left,
        PropertyKind::Origin => !node.has_origin,
        PropertyKind::Species => {
            let Some(species) = entry.property.species() else {
                return false;
            };
            let (count, spent) = committed_traits(node, catalog);
            !node.has_species
                && count <= species.max_traits
                && (count < species.max_traits || species.trait_points - spent == 0)
        }
        PropertyKind::Trait => {
            if node.has_traits {
                false
            } else if !node.has_species {
                true
            } else if node.traits_left == 1 {
                node.trait_balance - entry.property.cost == 0
            } else {
                node.traits_left > 1
            }
        }
    }
}

/// Number and summed cost of the committed traits.
fn committed_traits(node: &SearchNode, catalog: &Catalog<'_>) -> (i32, i32) {
    node.committed_of(catalog, PropertyKind::Trait)
        .iter()
        .fold((0, 0), |(count, spent), &t| {
            (count + 1, spent + catalog.property(t).cost)
        })
}

/// Whether `group` can still hold once `pick` is committed.
///
/// An `Or` with no committed member needs some other candidate that fits the
/// quota left after the pick. With the trait quota still unknown any
/// remaining member will do.
fn group_viable(node: &SearchNode, catalog: &Catalog<'_>, group: &Group, pick: usize) -> bool {
    let present = |m: &usize| *m == pick || node.is_committed(*m);
    match group.gate {
        Gate::Nor => !group.members.iter().any(present),
        Gate::Or | Gate::Required => {
            if group.members.iter().any(present) {
                return true;
            }
            let budget = node.available(group.kind).map(|available| {
                if catalog.kind(pick) == group.kind {
                    available - catalog.entry(pick).consumption
                } else {
                    available
                }
            });
            group.members.iter().any(|&m| {
                m != pick
                    && node.remaining.contains(&m)
                    && budget.map_or(true, |b| catalog.entry(m).consumption <= b)
            })
        }
    }
}

/// Commits `pick` together with everything it strictly requires, then evicts
/// the candidates that became impossible.
///
/// Returns false if any of it cannot be committed or if an open obligation is
/// left with nothing to satisfy it. `node` must then be discarded.
pub fn commit<R: Rng>(node: &mut SearchNode, catalog: &Catalog<'_>, pick: usize, rng: &mut R) -> bool {
    let mut queue = VecDeque::from([pick]);
    while let Some(next) = queue.pop_front() {
        if node.is_committed(next) {
            continue;
        }
        if !node.remaining.contains(&next) || !can_add(node, catalog, next) {
            log::trace!(
                "Rejected {} while committing {}",
                catalog.property(next).identifier,
                catalog.property(pick).identifier
            );
            return false;
        }
        add(node, catalog, next, rng);
        queue.extend(catalog.requirements(next).filter(|&r| !node.is_committed(r)));
    }

    propagate(node, catalog);
    obligations_reachable(node, catalog)
}

/// Applies the side effects of committing `index`.
fn add<R: Rng>(node: &mut SearchNode, catalog: &Catalog<'_>, index: usize, rng: &mut R) {
    let entry = catalog.entry(index);
    node.evict(catalog, index);
    node.solution.push(index);

    match entry.kind {
        PropertyKind::Authority => node.has_authority = true,
        PropertyKind::Civics => node.civics_left -= 1,
        PropertyKind::Ethics => node.ethic_points_left -= entry.consumption,
        PropertyKind::Origin => node.has_origin = true,
        PropertyKind::Species => {
            if let Some(species) = entry.property.species() {
                let (count, spent) = committed_traits(node, catalog);
                node.has_species = true;
                node.traits_left = species.max_traits - count;
                node.trait_balance = species.trait_points - spent;
                node.push_restriction(Restriction::TraitsNext);
                settle_traits(node, rng);
            }
        }
        PropertyKind::Trait => {
            if node.has_species {
                node.traits_left -= 1;
                node.trait_balance -= entry.property.cost;
                settle_traits(node, rng);
            } else {
                node.push_restriction(Restriction::SpeciesNext);
            }
        }
    }
    debug_assert!(node.civics_left >= 0 && node.ethic_points_left >= 0);
    debug_assert!(!node.has_species || node.traits_left >= 0);

    for (&owner, open) in node.pending.iter_mut() {
        let groups = &catalog.entry(owner).groups;
        open.retain(|&g| !groups[g].members.contains(&index));
    }
    let open: Vec<usize> = entry
        .groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.gate == Gate::Or && !g.members.iter().any(|&m| node.is_committed(m)))
        .map(|(i, _)| i)
        .collect();
    node.pending.insert(index, open);
}

/// Once the trait points balance out, traits are done if at most one slot is
/// left; otherwise a coin flip decides whether to keep going.
fn settle_traits<R: Rng>(node: &mut SearchNode, rng: &mut R) {
    if node.has_traits || node.trait_balance != 0 {
        return;
    }
    if node.traits_left <= 1 || !rng.gen_bool(0.5) {
        node.has_traits = true;
    }
}

/// Evicts every candidate that can no longer be committed, together with
/// whatever strictly requires it, until nothing changes.
pub fn propagate(node: &mut SearchNode, catalog: &Catalog<'_>) {
    loop {
        let view: &SearchNode = node;
        let mut queue: VecDeque<usize> = view
            .remaining
            .iter()
            .copied()
            .filter(|&r| !can_add(view, catalog, r))
            .collect();
        if queue.is_empty() {
            return;
        }
        while let Some(doomed) = queue.pop_front() {
            if !node.evict(catalog, doomed) {
                continue;
            }
            queue.extend(
                catalog
                    .entry(doomed)
                    .required_by
                    .iter()
                    .copied()
                    .filter(|r| node.remaining.contains(r)),
            );
        }
    }
}

/// Every open `Or` obligation still has a candidate that could satisfy it.
fn obligations_reachable(node: &SearchNode, catalog: &Catalog<'_>) -> bool {
    node.pending.iter().all(|(&owner, open)| {
        let groups = &catalog.entry(owner).groups;
        open.iter()
            .all(|&g| groups[g].members.iter().any(|m| node.remaining.contains(m)))
    })
}

/// Every quota not yet filled still has a candidate of its kind.
pub fn quotas_reachable(node: &SearchNode, catalog: &Catalog<'_>) -> bool {
    PropertyKind::ALL.into_iter().all(|kind| {
        let open = node.available(kind).is_some_and(|left| left > 0);
        !open || node.remaining.iter().any(|&i| catalog.kind(i) == kind)
    })
}
