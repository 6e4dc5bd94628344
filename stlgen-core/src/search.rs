//! Randomized depth-first search over [`SearchNode`]s.
//!
//! Nodes live in a stack arena: the parent of the node at depth `d` is the
//! node at `d - 1`. Every step either pushes a child, evicts a candidate from
//! the top node, or pops the top node and evicts the pick that produced it
//! from its parent, so one search always terminates.

use crate::catalog::Catalog;
use crate::rules;
use crate::state::SearchNode;
use rand::Rng;
use stldata::Quotas;

/// Outcome of one [`Search::next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A property was committed in a new child node.
    Advanced,
    /// The pick could not be committed and was evicted from the current node.
    Rejected,
    /// The current node ran out of candidates; the search is back at its parent.
    Backtracked,
    /// The new top node is a complete bundle.
    Solved,
    /// The root ran out of candidates.
    Exhausted,
}

pub struct Search<'c, 'a> {
    catalog: &'c Catalog<'a>,
    nodes: Vec<SearchNode>,
    steps: u32,
}

impl<'c, 'a> Search<'c, 'a> {
    /// Starts from a fresh root, with candidates that can never be chosen
    /// already evicted.
    pub fn new(catalog: &'c Catalog<'a>, quotas: &Quotas) -> Self {
        let mut root = SearchNode::root(catalog, quotas);
        rules::propagate(&mut root, catalog);
        log::trace!("Root has {} of {} candidates", root.remaining.len(), catalog.len());
        Search {
            catalog,
            nodes: vec![root],
            steps: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn current(&self) -> Option<&SearchNode> {
        self.nodes.last()
    }

    /// Takes one step from the current node.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> Step {
        let catalog = self.catalog;
        let depth = self.depth();
        let Some(top) = self.nodes.last_mut() else {
            return Step::Exhausted;
        };
        self.steps += 1;

        let restriction = top.active_restriction();
        let pool: Vec<usize> = top
            .remaining
            .iter()
            .copied()
            .filter(|&i| restriction.map_or(true, |r| r.admits(catalog.kind(i))))
            .collect();

        if pool.is_empty() {
            return self.backtrack();
        }

        let weight_sum = match restriction {
            None => top.weight_sum,
            Some(_) => pool.iter().map(|&i| catalog.entry(i).weight).sum(),
        };
        let pick = weighted_pick(catalog, &pool, weight_sum, rng);

        let mut child = top.clone();
        child.origin_pick = Some(pick);
        if !rules::commit(&mut child, catalog, pick, rng) || !rules::quotas_reachable(&child, catalog) {
            log::trace!("{} rejected at depth {}", catalog.property(pick).identifier, depth);
            top.evict(catalog, pick);
            return Step::Rejected;
        }

        log::trace!("Committed {} at depth {}", catalog.property(pick).identifier, depth + 1);
        let solved = child.is_solution();
        self.nodes.push(child);
        if solved {
            Step::Solved
        } else {
            Step::Advanced
        }
    }

    fn backtrack(&mut self) -> Step {
        let Some(dead) = self.nodes.pop() else {
            return Step::Exhausted;
        };
        match (self.nodes.last_mut(), dead.origin_pick) {
            (Some(parent), Some(pick)) => {
                parent.evict(self.catalog, pick);
                Step::Backtracked
            }
            _ => Step::Exhausted,
        }
    }

    /// Steps until a bundle is found, the search is exhausted, or `max_steps`
    /// steps have been taken.
    pub fn run<R: Rng>(&mut self, rng: &mut R, max_steps: u32) -> Option<&SearchNode> {
        while self.steps < max_steps {
            match self.next(rng) {
                Step::Solved => return self.nodes.last(),
                Step::Exhausted => return None,
                Step::Advanced | Step::Rejected | Step::Backtracked => {}
            }
        }
        log::debug!("Search stopped after {} steps", self.steps);
        None
    }
}

/// Draws from `[0, weight_sum)` and walks the pool accumulating weights.
pub fn weighted_pick<R: Rng>(catalog: &Catalog<'_>, pool: &[usize], weight_sum: u64, rng: &mut R) -> usize {
    debug_assert!(!pool.is_empty() && weight_sum > 0);
    let draw = rng.gen_range(0..weight_sum);
    let mut cumulative = 0;
    for &candidate in pool {
        cumulative += catalog.entry(candidate).weight;
        if draw < cumulative {
            return candidate;
        }
    }
    pool[pool.len() - 1]
}
