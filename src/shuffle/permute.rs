//! Permutation sources.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A source of permutations.
///
/// The shuffle engine draws every random decision through this trait, so a
/// fixed implementation makes the whole pipeline deterministic.
pub trait Permuter {
    /// A permutation of `0..len`. Entry `i` is the old index of the item
    /// that moves to position `i`.
    fn permutation(&mut self, len: usize) -> Vec<usize>;
}

/// Uniform random permutations from a seedable generator.
#[derive(Debug, Clone)]
pub struct SeededPermuter {
    rng: StdRng,
}

impl SeededPermuter {
    /// Deterministic permuter for a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Permuter seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Permuter for one variant of a batch: derived from the batch seed when
    /// there is one, otherwise from entropy.
    pub fn for_variant(seed: Option<u64>, index: usize) -> Self {
        match seed {
            Some(seed) => Self::from_seed(variant_seed(seed, index)),
            None => Self::from_entropy(),
        }
    }
}

impl Permuter for SeededPermuter {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// Replays queued permutations; falls back to identity when the queue is
/// empty or the next entry has the wrong length.
#[derive(Debug, Clone, Default)]
pub struct FixedPermuter {
    orders: VecDeque<Vec<usize>>,
}

impl FixedPermuter {
    /// Create from permutations in draw order.
    pub fn new(orders: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    /// Identity permutations only.
    pub fn identity() -> Self {
        Self::default()
    }
}

impl Permuter for FixedPermuter {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        match self.orders.front() {
            Some(order) if order.len() == len => self.orders.pop_front().unwrap_or_default(),
            _ => (0..len).collect(),
        }
    }
}

/// Independent seed for variant `index` of a batch.
pub fn variant_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Reorder `items` so that position `i` holds `items[order[i]]`.
///
/// `order` must be a permutation of `0..items.len()`; anything else leaves
/// the items in their original order.
pub fn apply_permutation<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    if !is_permutation(order, items.len()) {
        log::warn!("ignoring invalid permutation {:?}", order);
        return items;
    }
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots[i].take()).collect()
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    order
        .iter()
        .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}
