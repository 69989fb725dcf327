//! Frame stack allocator.
//!
//! [`StackAllocator`] bump-allocates frames from an [`AlignedArena`] and
//! releases them in LIFO order. Every frame is laid out as
//!
//! ```text
//! | payload: align(n) bytes | marker: FRAME_OVERHEAD bytes |
//! ^ start                                                   ^ next frame
//! ```
//!
//! where the marker records `start`. Releasing `k` frames reads `k`
//! markers backwards from the top, each one saying how far to rewind for
//! its own frame, so the cost is O(k) whatever the frame sizes.
//! Frame metadata lives in the arena itself and moves with it on growth.

use std::fmt;

use stratum_core::{align, size, ArenaError, GrowthPolicy};

use crate::aligned::AlignedArena;
use crate::marker::FrameMarker;
use crate::raw::{Global, RawAllocator};
use crate::reservation::Reservation;

/// Bytes each frame spends on its marker, on top of the aligned payload.
pub const FRAME_OVERHEAD: usize = FrameMarker::SLOT;

/// LIFO allocator over a growable aligned arena.
///
/// ```
/// use stratum_arena::StackAllocator;
///
/// let mut stack = StackAllocator::new(256)?;
/// stack.alloc(10)?;
/// let second = stack.alloc(20)?.offset();
/// stack.free(1);
/// assert_eq!(stack.alloc(5)?.offset(), second);
/// # Ok::<(), stratum_arena::ArenaError>(())
/// ```
pub struct StackAllocator<A: RawAllocator = Global> {
    arena: AlignedArena<A>,
    /// Live frames; bounds how many markers `free` may follow.
    frames: usize,
}

impl StackAllocator<Global> {
    /// Create a stack with at least `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_policy(capacity, GrowthPolicy::default())
    }

    /// As [`new`](Self::new), with a custom growth policy.
    pub fn with_policy(capacity: usize, policy: GrowthPolicy) -> Result<Self, ArenaError> {
        Self::with_allocator(capacity, policy, Global)
    }
}

impl<A: RawAllocator> StackAllocator<A> {
    /// Create a stack backed by `alloc`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the policy is invalid.
    pub fn with_allocator(
        capacity: usize,
        policy: GrowthPolicy,
        alloc: A,
    ) -> Result<Self, ArenaError> {
        let arena = AlignedArena::with_allocator(capacity, policy, alloc)?;
        Ok(Self { arena, frames: 0 })
    }

    /// Push a frame with an `n`-byte payload.
    ///
    /// The returned reservation is the payload: exactly `n` bytes at an
    /// aligned address, with [`offset`](Reservation::offset) equal to the
    /// stack height before this call. `n == 0` still pushes a frame.
    pub fn alloc(&mut self, n: usize) -> Result<Reservation<'_>, ArenaError> {
        let payload = align::align_up(n)?;
        let total = size::add(payload, FRAME_OVERHEAD, self.arena.policy().max_capacity)?;
        let bytes = self.arena.bytes_mut();
        let start = bytes.reserve(total)?;
        FrameMarker::new(start).write_to(bytes.region_mut(start + payload, FRAME_OVERHEAD));
        self.frames += 1;
        let bytes = self.arena.bytes_mut();
        Ok(Reservation::new(start, bytes.region_mut(start, n)))
    }

    /// Pop the `frames` most recent frames.
    ///
    /// # Panics
    ///
    /// Panics if `frames` exceeds [`frame_count`](Self::frame_count).
    pub fn free(&mut self, frames: usize) {
        assert!(
            frames <= self.frames,
            "cannot free {frames} frames from a stack holding {}",
            self.frames,
        );
        let mut top: usize = self.arena.len();
        for _ in 0..frames {
            let slot: usize = top - FRAME_OVERHEAD;
            let marker = FrameMarker::read_from(&self.arena.as_slice()[slot..top]);
            assert!(
                marker.start() <= slot,
                "corrupt frame marker at offset {slot}: start {}",
                marker.start(),
            );
            top = marker.start();
        }
        tracing::trace!(frames, from = self.arena.len(), to = top, "stack frames freed");
        self.arena.bytes_mut().truncate(top);
        self.frames -= frames;
    }

    /// Pop every frame at once. Capacity is kept.
    pub fn reset(&mut self) {
        self.arena.discard_all();
        self.frames = 0;
    }

    /// Number of live frames.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Current stack height in bytes, markers and padding included.
    pub fn used(&self) -> usize {
        self.arena.len()
    }

    /// Whether no frame is live.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Base address. Invalidated by growth.
    pub fn as_ptr(&self) -> *const u8 {
        self.arena.as_ptr()
    }

    /// Every live byte, payloads and markers alike. Payload `i` is at the
    /// offset its reservation reported.
    pub fn as_slice(&self) -> &[u8] {
        self.arena.as_slice()
    }

    /// Number of times the backing allocation has been resized.
    pub fn generation(&self) -> u64 {
        self.arena.generation()
    }
}

impl<A: RawAllocator> fmt::Debug for StackAllocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackAllocator")
            .field("frames", &self.frames)
            .field("used", &self.used())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::align::{align_up, is_aligned};
    use stratum_core::ALIGNMENT_BOUNDARY;

    fn frame_size(n: usize) -> usize {
        align_up(n).unwrap() + FRAME_OVERHEAD
    }

    #[test]
    fn alloc_consumes_payload_plus_marker() {
        let mut stack = StackAllocator::new(256).unwrap();
        let r = stack.alloc(10).unwrap();
        assert_eq!(r.offset(), 0);
        assert_eq!(r.len(), 10);
        assert_eq!(stack.used(), frame_size(10));
        assert_eq!(stack.frame_count(), 1);
    }

    #[test]
    fn free_one_restores_height_after_first_alloc() {
        let mut stack = StackAllocator::new(256).unwrap();
        stack.alloc(10).unwrap();
        let after_first = stack.used();
        stack.alloc(20).unwrap();
        stack.free(1);
        assert_eq!(stack.used(), after_first);
        assert_eq!(stack.frame_count(), 1);
    }

    #[test]
    fn free_two_restores_empty() {
        let mut stack = StackAllocator::new(256).unwrap();
        stack.alloc(10).unwrap();
        stack.alloc(20).unwrap();
        stack.free(2);
        assert_eq!(stack.used(), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn freed_space_is_reused_at_same_address() {
        let mut stack = StackAllocator::new(256).unwrap();
        stack.alloc(10).unwrap();
        let second = stack.alloc(20).unwrap().as_ptr();
        stack.free(1);
        let third = stack.alloc(5).unwrap().as_ptr();
        assert_eq!(third, second);
    }

    #[test]
    fn payloads_are_aligned_and_independent() {
        let mut stack = StackAllocator::new(8).unwrap();
        let mut offsets = Vec::new();
        for (i, n) in [3usize, 17, 1, 40].into_iter().enumerate() {
            let mut r = stack.alloc(n).unwrap();
            assert!(is_aligned(r.as_ptr() as usize));
            r.fill(i as u8 + 1);
            offsets.push((r.offset(), n, i as u8 + 1));
        }
        for (offset, n, value) in offsets {
            assert!(stack.as_slice()[offset..offset + n].iter().all(|&b| b == value));
        }
    }

    #[test]
    fn markers_survive_growth() {
        let mut stack = StackAllocator::new(1).unwrap();
        let heights: Vec<usize> = (0..50)
            .map(|i| {
                let h = stack.used();
                stack.alloc(i * 7).unwrap();
                h
            })
            .collect();
        assert!(stack.generation() > 0);
        for &h in heights.iter().rev() {
            stack.free(1);
            assert_eq!(stack.used(), h);
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn zero_sized_frame_still_counts() {
        let mut stack = StackAllocator::new(64).unwrap();
        let r = stack.alloc(0).unwrap();
        assert!(r.is_empty());
        assert_eq!(stack.used(), FRAME_OVERHEAD);
        stack.free(1);
        assert_eq!(stack.used(), 0);
    }

    #[test]
    fn free_zero_is_a_no_op() {
        let mut stack = StackAllocator::new(64).unwrap();
        stack.alloc(4).unwrap();
        let used = stack.used();
        stack.free(0);
        assert_eq!(stack.used(), used);
        assert_eq!(stack.frame_count(), 1);
    }

    #[test]
    fn reset_pops_everything() {
        let mut stack = StackAllocator::new(64).unwrap();
        stack.alloc(4).unwrap();
        stack.alloc(4).unwrap();
        stack.reset();
        assert!(stack.is_empty());
        assert_eq!(stack.used(), 0);
        assert_eq!(stack.alloc(1).unwrap().offset(), 0);
    }

    #[test]
    #[should_panic(expected = "cannot free 2 frames from a stack holding 1")]
    fn over_free_panics() {
        let mut stack = StackAllocator::new(64).unwrap();
        stack.alloc(4).unwrap();
        stack.free(2);
    }

    #[test]
    fn payload_overflow_is_reported_without_pushing() {
        let mut stack = StackAllocator::new(64).unwrap();
        assert!(stack.alloc(usize::MAX).is_err());
        let max = stack.arena.policy().max_capacity;
        assert!(stack.alloc(max).is_err());
        assert!(stack.is_empty());
        assert_eq!(stack.used(), 0);
    }

    #[test]
    fn overhead_is_one_aligned_word() {
        assert!(FRAME_OVERHEAD >= std::mem::size_of::<usize>());
        assert_eq!(FRAME_OVERHEAD % ALIGNMENT_BOUNDARY, 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn free_k_restores_height_before_last_k(
                sizes in proptest::collection::vec(0usize..200, 1..40),
                k_seed in any::<usize>(),
            ) {
                let mut stack = StackAllocator::new(16).unwrap();
                let mut heights = Vec::new();
                for &n in &sizes {
                    heights.push(stack.used());
                    stack.alloc(n).unwrap();
                }
                let k = k_seed % (sizes.len() + 1);
                stack.free(k);
                let expected = if k == 0 {
                    frame_total(&sizes)
                } else {
                    heights[sizes.len() - k]
                };
                prop_assert_eq!(stack.used(), expected);
                prop_assert_eq!(stack.frame_count(), sizes.len() - k);
            }
        }

        fn frame_total(sizes: &[usize]) -> usize {
            sizes.iter().map(|&n| frame_size(n)).sum()
        }
    }
}
