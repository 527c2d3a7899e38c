use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::CompileError;

/// A source of uniform integers for weighted selection.
///
/// Implementations are shared across evaluation threads.
pub trait RandomSource: Send + Sync {
    /// Draw uniformly from `[0, bound)`. `bound` is always greater than zero.
    fn next_below(&self, bound: u32) -> u32;
}

/// Draws from the calling thread's `rand::thread_rng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// A reproducible source backed by a seeded `StdRng`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&self, bound: u32) -> u32 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.gen_range(0..bound)
    }
}

/// Items paired with integer weights, flattened into a step function over
/// `[0, total_weight)`.
///
/// Entry `i` owns the seeds from the sum of the weights before it up to
/// (but excluding) that sum plus its own weight, so every in-range seed maps
/// to exactly one entry.
#[derive(Debug)]
pub struct WeightedList<T> {
    items: Vec<T>,
    upper_bounds: Vec<u32>,
    total_weight: u32,
}

impl<T> WeightedList<T> {
    /// Build from `(item, weight)` pairs in order.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptyWeightedList`] for no entries,
    /// [`CompileError::ZeroWeight`] for a zero weight, and
    /// [`CompileError::WeightOverflow`] if the weights do not fit in `u32`.
    pub fn new(entries: impl IntoIterator<Item = (T, u32)>) -> Result<Self, CompileError> {
        let mut items = Vec::new();
        let mut upper_bounds = Vec::new();
        let mut total_weight: u32 = 0;

        for (index, (item, weight)) in entries.into_iter().enumerate() {
            if weight == 0 {
                return Err(CompileError::ZeroWeight { index });
            }
            total_weight = total_weight
                .checked_add(weight)
                .ok_or(CompileError::WeightOverflow)?;
            items.push(item);
            upper_bounds.push(total_weight);
        }

        if items.is_empty() {
            return Err(CompileError::EmptyWeightedList);
        }

        Ok(Self {
            items,
            upper_bounds,
            total_weight,
        })
    }

    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item owning `seed`, or `None` when `seed >= total_weight`.
    #[must_use]
    pub fn get(&self, seed: u32) -> Option<&T> {
        if seed >= self.total_weight {
            return None;
        }
        let index = self.upper_bounds.partition_point(|&bound| bound <= seed);
        self.items.get(index)
    }

    /// Draw a seed from `random` and return the item owning it.
    pub fn pick(&self, random: &dyn RandomSource) -> Option<&T> {
        self.get(random.next_below(self.total_weight))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
