//! The platform alignment boundary and checked rounding to it.

use std::mem::size_of;

use crate::error::{ArenaError, SizeOp};

/// Every fundamental scalar the platform has. Its size is a multiple of
/// the strictest alignment among them.
#[repr(C)]
#[allow(dead_code)]
#[derive(Clone, Copy)]
union MaxAlign {
    i8: i8,
    i16: i16,
    i32: i32,
    i64: i64,
    i128: i128,
    isize: isize,
    f32: f32,
    f64: f64,
    ptr: *const u8,
    fn_ptr: fn(),
}

/// Rounding unit for every size that passes through an aligned arena.
///
/// Any offset that is a multiple of this, taken from a base that is
/// itself aligned to it, is valid storage for any fundamental scalar.
pub const ALIGNMENT_BOUNDARY: usize = size_of::<MaxAlign>();

const _: () = assert!(ALIGNMENT_BOUNDARY.is_power_of_two());
const _: () = assert!(ALIGNMENT_BOUNDARY >= std::mem::align_of::<MaxAlign>());

/// Round `n` up to a multiple of [`ALIGNMENT_BOUNDARY`], or `None` if the
/// result is not representable.
pub const fn checked_align_up(n: usize) -> Option<usize> {
    if n > usize::MAX - (ALIGNMENT_BOUNDARY - 1) {
        return None;
    }
    Some((n + ALIGNMENT_BOUNDARY - 1) & !(ALIGNMENT_BOUNDARY - 1))
}

/// Round `n` up to a multiple of [`ALIGNMENT_BOUNDARY`].
///
/// Returns [`SizeOp::AlignUp`] overflow instead of wrapping.
pub fn align_up(n: usize) -> Result<usize, ArenaError> {
    checked_align_up(n).ok_or(ArenaError::overflow(SizeOp::AlignUp, n, ALIGNMENT_BOUNDARY))
}

/// Round `n` down to a multiple of [`ALIGNMENT_BOUNDARY`].
pub const fn align_down(n: usize) -> usize {
    n & !(ALIGNMENT_BOUNDARY - 1)
}

/// Whether `n` is a multiple of [`ALIGNMENT_BOUNDARY`].
pub const fn is_aligned(n: usize) -> bool {
    n & (ALIGNMENT_BOUNDARY - 1) == 0
}
