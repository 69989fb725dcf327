//! Fixed-stride element builder.
//!
//! [`FixedStrideBuilder`] is a [`ByteArena`] that counts in elements of a
//! fixed byte stride. Every count is multiplied by the stride (checked)
//! before reaching the byte arena, and byte offsets coming back are
//! divided down again.

use std::fmt;
use std::slice::ChunksExact;

use stratum_core::{size, ArenaError, GrowthPolicy};

use crate::byte::ByteArena;
use crate::raw::{Global, RawAllocator};
use crate::reservation::Reservation;

/// A growable array of fixed-size byte records.
///
/// All counts and offsets in the public API are in elements. The
/// underlying byte length and capacity are always multiples of
/// [`stride`](Self::stride).
///
/// ```
/// use stratum_arena::FixedStrideBuilder;
///
/// let mut points = FixedStrideBuilder::new(8, 2)?;
/// let first = points.append(&[0u8; 16], 2)?;
/// let third = points.append(&[1u8; 8], 1)?;
/// assert_eq!((first, third), (0, 2));
/// assert_eq!(points.element(2), Some(&[1u8; 8][..]));
/// # Ok::<(), stratum_arena::ArenaError>(())
/// ```
pub struct FixedStrideBuilder<A: RawAllocator = Global> {
    arena: ByteArena<A>,
    /// Bytes per element. Positive and fixed for the builder's lifetime.
    stride: usize,
}

impl FixedStrideBuilder<Global> {
    /// Create a builder for elements of `stride` bytes with room for
    /// `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `stride` or `capacity` is zero.
    pub fn new(stride: usize, capacity: usize) -> Result<Self, ArenaError> {
        Self::with_policy(stride, capacity, GrowthPolicy::default())
    }

    /// As [`new`](Self::new), with a custom growth policy.
    pub fn with_policy(
        stride: usize,
        capacity: usize,
        policy: GrowthPolicy,
    ) -> Result<Self, ArenaError> {
        Self::with_allocator(stride, capacity, policy, Global)
    }
}

impl<A: RawAllocator> FixedStrideBuilder<A> {
    /// Create a builder backed by `alloc`.
    ///
    /// The policy maximum is rounded down to a whole number of elements.
    /// `capacity * stride` beyond that maximum is an
    /// [`ArenaError::Overflow`].
    ///
    /// # Panics
    ///
    /// Panics if `stride` or `capacity` is zero, or if the policy cannot
    /// hold a single element.
    pub fn with_allocator(
        stride: usize,
        capacity: usize,
        policy: GrowthPolicy,
        alloc: A,
    ) -> Result<Self, ArenaError> {
        assert!(stride > 0, "element stride must be positive");
        assert!(capacity > 0, "element capacity must be positive");
        policy.validate();
        let policy = policy.rounded_to(stride);
        assert!(
            policy.max_capacity >= stride,
            "max_capacity cannot hold one element of {stride} bytes",
        );
        let bytes = size::mul(capacity, stride, policy.max_capacity)?;
        let arena = ByteArena::with_allocator(bytes, policy, alloc)?;
        Ok(Self { arena, stride })
    }

    /// Append `count` elements stored back to back in `elements`.
    ///
    /// Returns the element offset of the first one. `count == 0` is a
    /// no-op returning the current length.
    ///
    /// # Panics
    ///
    /// Panics if `elements.len()` is not `count * stride`.
    pub fn append(&mut self, elements: &[u8], count: usize) -> Result<usize, ArenaError> {
        let bytes = self.byte_len(count)?;
        assert_eq!(
            elements.len(),
            bytes,
            "expected {count} elements of {} bytes",
            self.stride,
        );
        let offset = self.arena.append(elements)?;
        Ok(self.element_offset(offset))
    }

    /// Reserve `count` elements for the caller to fill.
    ///
    /// The reservation's offset is in elements; its slice is
    /// `count * stride` bytes.
    pub fn append_for_write(&mut self, count: usize) -> Result<Reservation<'_>, ArenaError> {
        let bytes = self.byte_len(count)?;
        let stride = self.stride;
        let reservation = self.arena.append_for_write(bytes)?;
        debug_assert_eq!(reservation.offset() % stride, 0);
        let offset = reservation.offset() / stride;
        Ok(reservation.with_offset(offset))
    }

    /// Forget every element. Capacity is kept.
    pub fn discard_all(&mut self) {
        self.arena.discard_all();
    }

    /// Forget the last `count` elements.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`len`](Self::len).
    pub fn discard_last(&mut self, count: usize) {
        assert!(
            count <= self.len(),
            "cannot discard {count} elements from a builder holding {}",
            self.len(),
        );
        self.arena.discard_last(count * self.stride);
    }

    /// The element at `index`, or `None` past the end.
    pub fn element(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.stride;
        Some(&self.arena.as_slice()[start..start + self.stride])
    }

    /// The element at `index`, mutably.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.stride;
        let stride = self.stride;
        Some(&mut self.arena.as_mut_slice()[start..start + stride])
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> ChunksExact<'_, u8> {
        self.arena.as_slice().chunks_exact(self.stride)
    }

    /// Base address. Invalidated by growth, like [`ByteArena::as_ptr`].
    pub fn as_ptr(&self) -> *const u8 {
        self.arena.as_ptr()
    }

    /// All element bytes, `len() * stride()` long.
    pub fn as_slice(&self) -> &[u8] {
        self.arena.as_slice()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.arena.len() / self.stride
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> usize {
        self.arena.capacity() / self.stride
    }

    /// Bytes per element.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of times the backing allocation has been resized.
    pub fn generation(&self) -> u64 {
        self.arena.generation()
    }

    fn byte_len(&self, count: usize) -> Result<usize, ArenaError> {
        size::mul(count, self.stride, self.arena.policy().max_capacity)
    }

    fn element_offset(&self, byte_offset: usize) -> usize {
        debug_assert_eq!(byte_offset % self.stride, 0);
        byte_offset / self.stride
    }
}

impl<A: RawAllocator> fmt::Debug for FixedStrideBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedStrideBuilder")
            .field("stride", &self.stride)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
