//! Arena growth policy.

use crate::align::align_down;
use crate::error::{ArenaError, SizeOp};
use crate::size;

/// How an arena's capacity grows when an append does not fit.
///
/// Capacity is multiplied by `growth_factor` until it holds the request,
/// each step clamped to `max_capacity`. Requests that would need more than
/// `max_capacity` bytes fail with [`ArenaError::Overflow`].
///
/// A small `max_capacity` makes the overflow paths easy to exercise in
/// tests without allocating anything near the address-space limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Multiplier applied per growth step. Must be at least 2.
    ///
    /// Default: 2 (capacity doubles).
    pub growth_factor: usize,

    /// Largest capacity, in bytes, an arena may ever reach. Must be positive.
    ///
    /// Default: [`GrowthPolicy::DEFAULT_MAX_CAPACITY`].
    pub max_capacity: usize,
}

impl GrowthPolicy {
    /// Default growth factor: doubling.
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    /// Default maximum capacity: the largest size a single allocation can
    /// describe (`isize::MAX`), rounded down to the alignment boundary.
    pub const DEFAULT_MAX_CAPACITY: usize = align_down(isize::MAX as usize);

    /// Create the default doubling policy.
    pub const fn new() -> Self {
        Self {
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
        }
    }

    /// Replace the growth factor.
    pub const fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Replace the maximum capacity.
    pub const fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Check the policy's own invariants.
    ///
    /// # Panics
    ///
    /// Panics if `growth_factor < 2` or `max_capacity == 0`. A bad policy
    /// is a programming error, not a runtime condition.
    pub fn validate(&self) {
        assert!(
            self.growth_factor >= 2,
            "growth_factor must be at least 2 (got {})",
            self.growth_factor,
        );
        assert!(self.max_capacity > 0, "max_capacity must be positive");
    }

    /// Copy of this policy whose `max_capacity` is a multiple of `unit`.
    ///
    /// Layers that keep capacity a multiple of some unit (element stride,
    /// alignment boundary) use this so a clamped growth step keeps the
    /// invariant.
    pub fn rounded_to(&self, unit: usize) -> Self {
        Self {
            growth_factor: self.growth_factor,
            max_capacity: size::round_down(self.max_capacity, unit),
        }
    }

    /// Capacity to grow to from `current` so that `required` bytes fit.
    ///
    /// Returns `current` unchanged when it already suffices. Fails with
    /// [`SizeOp::Grow`] overflow when `required` exceeds `max_capacity`.
    pub fn next_capacity(&self, current: usize, required: usize) -> Result<usize, ArenaError> {
        if required > self.max_capacity {
            return Err(ArenaError::overflow(SizeOp::Grow, current, required));
        }
        let mut capacity = current.max(1);
        while capacity < required {
            capacity = match size::mul(capacity, self.growth_factor, self.max_capacity) {
                Ok(grown) => grown,
                Err(_) => self.max_capacity,
            };
        }
        Ok(capacity.max(current))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}
