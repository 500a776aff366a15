//! Uniform random selection over fragment pools.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::schema::bank::Direction;

/// A pool that should never be empty was empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot pick from empty pool '{pool}'")]
pub struct EmptyPoolError {
    pub pool: String,
}

/// Source of randomness for all fragment picks.
///
/// Seed it for reproducible output; `from_entropy` for production use.
#[derive(Debug, Clone)]
pub struct FragmentSampler {
    rng: StdRng,
}

impl FragmentSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Pick one element uniformly. `pool` names the pool in the error.
    pub fn pick_one<'a, T>(&mut self, items: &'a [T], pool: &str) -> Result<&'a T, EmptyPoolError> {
        if items.is_empty() {
            return Err(EmptyPoolError {
                pool: pool.to_string(),
            });
        }
        Ok(&items[self.rng.gen_range(0..items.len())])
    }

    /// Pick one element uniformly from an iterator of known length,
    /// such as the keys of a map.
    pub fn pick_from<I>(&mut self, items: I, pool: &str) -> Result<I::Item, EmptyPoolError>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
    {
        let mut iter = items.into_iter();
        let len = iter.len();
        let empty = || EmptyPoolError {
            pool: pool.to_string(),
        };
        if len == 0 {
            return Err(empty());
        }
        iter.nth(self.rng.gen_range(0..len)).ok_or_else(empty)
    }

    pub fn pick_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}

impl Default for FragmentSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}
