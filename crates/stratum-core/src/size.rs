//! Checked size arithmetic against an explicit upper bound.
//!
//! Every check happens before the operation it guards, in the
//! `lhs > max - rhs` / `lhs > max / rhs` form, so no intermediate value
//! can wrap even when `max` is `usize::MAX`.

use crate::error::{ArenaError, SizeOp};

/// `lhs + rhs`, or [`SizeOp::Add`] overflow if the sum would exceed `max`.
pub fn add(lhs: usize, rhs: usize, max: usize) -> Result<usize, ArenaError> {
    if rhs > max || lhs > max - rhs {
        return Err(ArenaError::overflow(SizeOp::Add, lhs, rhs));
    }
    Ok(lhs + rhs)
}

/// `lhs * rhs`, or [`SizeOp::Mul`] overflow if the product would exceed `max`.
pub fn mul(lhs: usize, rhs: usize, max: usize) -> Result<usize, ArenaError> {
    if rhs != 0 && lhs > max / rhs {
        return Err(ArenaError::overflow(SizeOp::Mul, lhs, rhs));
    }
    Ok(lhs * rhs)
}

/// Largest multiple of `unit` that is `<= n`.
///
/// # Panics
///
/// Panics if `unit` is zero.
pub const fn round_down(n: usize, unit: usize) -> usize {
    assert!(unit > 0, "rounding unit must be positive");
    n - n % unit
}
