//! Error types for the Stratum arenas.
//!
//! Only recoverable failures live here: the backing allocation could not
//! be obtained or resized, or a size computation would leave the
//! representable range. Caller contract violations (discarding more than
//! was appended, zero strides, ...) are not errors; they panic.

use std::error::Error;
use std::fmt;

/// The arithmetic step that would have overflowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeOp {
    /// `lhs + rhs`, e.g. the arena's used length plus an append size.
    Add,
    /// `lhs * rhs`, e.g. an element count times the builder stride.
    Mul,
    /// Rounding `lhs` up to a multiple of `rhs`.
    AlignUp,
    /// Growing capacity `lhs` to hold `rhs` bytes past the policy maximum.
    Grow,
}

impl fmt::Display for SizeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Mul => write!(f, "multiply"),
            Self::AlignUp => write!(f, "align up"),
            Self::Grow => write!(f, "grow"),
        }
    }
}

/// Errors that can occur during arena operations.
///
/// Every fallible arena operation returns one of these instead of a
/// sentinel offset, and leaves the arena exactly as it was before the
/// call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The initial backing allocation could not be obtained.
    AllocationFailed {
        /// Number of bytes requested.
        requested: usize,
    },
    /// Resizing the backing allocation failed; the old block is intact.
    GrowthFailed {
        /// Capacity the arena tried to grow to, in bytes.
        requested: usize,
        /// Capacity the arena still has, in bytes.
        capacity: usize,
    },
    /// A size or offset computation would exceed the representable range.
    Overflow {
        /// Which computation was rejected.
        op: SizeOp,
        /// Left operand.
        lhs: usize,
        /// Right operand.
        rhs: usize,
    },
}

impl ArenaError {
    /// Shorthand for an [`ArenaError::Overflow`].
    pub fn overflow(op: SizeOp, lhs: usize, rhs: usize) -> Self {
        Self::Overflow { op, lhs, rhs }
    }

    /// Whether this error came from the allocator rather than arithmetic.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::GrowthFailed { .. }
        )
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { requested } => {
                write!(f, "arena allocation failed: requested {requested} bytes")
            }
            Self::GrowthFailed {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena growth failed: requested {requested} bytes, capacity stays {capacity} bytes"
                )
            }
            Self::Overflow { op, lhs, rhs } => {
                write!(f, "size overflow: cannot {op} {lhs} and {rhs}")
            }
        }
    }
}

impl Error for ArenaError {}
