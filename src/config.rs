//! Growth configuration shared by the stock policies.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::MAX_CAPACITY;

/// Capacity used by the first growth of an empty arena.
pub const DEFAULT_CAPACITY: usize = 64;

/// Lower bound applied to every growth step.
pub const MIN_CAPACITY: usize = 32;

/// Multiplier applied to the current capacity on each later growth.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;

/// How an arena grows when it runs out of free slots.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthConfig {
    /// Capacity of the first allocation.
    pub initial_capacity: usize,
    /// No growth step yields fewer slots than this.
    pub min_capacity: usize,
    /// Factor applied to the current capacity (values <= 1.0 still grow by one slot).
    pub growth_factor: f64,
    /// Hard cap; once reached the arena stops growing (None = up to `MAX_CAPACITY`).
    pub max_capacity: Option<usize>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            min_capacity: MIN_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_capacity: None,
        }
    }
}

impl GrowthConfig {
    /// A configuration that allocates exactly `capacity` slots once and never grows past it.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            min_capacity: 0,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_capacity: Some(capacity),
        }
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_min_capacity(mut self, capacity: usize) -> Self {
        self.min_capacity = capacity;
        self
    }

    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Effective upper bound on capacity.
    #[inline]
    pub fn limit(&self) -> usize {
        self.max_capacity.unwrap_or(MAX_CAPACITY).min(MAX_CAPACITY)
    }

    /// Next capacity after `current`, or `None` when the limit is reached.
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        let limit = self.limit();
        if current >= limit {
            return None;
        }

        let wanted = if current == 0 {
            self.initial_capacity
        } else {
            let scaled = (current as f64 * self.growth_factor) as usize;
            scaled.max(current + 1)
        };

        Some(wanted.max(self.min_capacity).max(current + 1).min(limit))
    }
}
