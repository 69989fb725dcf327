//! Byte arena with every size rounded to the alignment boundary.
//!
//! [`AlignedArena`] has the same contract as [`ByteArena`], but every
//! size it is given (initial capacity, append size, reservation size,
//! discard size) is first rounded up to [`ALIGNMENT_BOUNDARY`]. Since the
//! backing block is aligned to the boundary as well, every offset and
//! address it hands out can hold any fundamental scalar. The price is up
//! to `ALIGNMENT_BOUNDARY - 1` bytes of padding per append.

use std::fmt;

use stratum_core::align::{self, ALIGNMENT_BOUNDARY};
use stratum_core::{ArenaError, GrowthPolicy};

use crate::byte::ByteArena;
use crate::raw::{Global, RawAllocator};
use crate::reservation::Reservation;

/// A byte arena for heterogeneous, alignment-sensitive records.
pub struct AlignedArena<A: RawAllocator = Global> {
    arena: ByteArena<A>,
}

impl AlignedArena<Global> {
    /// Create an arena of at least `capacity` bytes.
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

impl<A: RawAllocator> AlignedArena<A> {
    /// Create an arena backed by `alloc`.
    ///
    /// `capacity` is rounded up and the policy maximum rounded down to
    /// the alignment boundary.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the policy maximum is smaller than
    /// one alignment unit.
    pub fn with_allocator(
        capacity: usize,
        policy: GrowthPolicy,
        alloc: A,
    ) -> Result<Self, ArenaError> {
        assert!(capacity > 0, "arena capacity must be positive");
        policy.validate();
        let policy = policy.rounded_to(ALIGNMENT_BOUNDARY);
        assert!(
            policy.max_capacity > 0,
            "max_capacity is smaller than the {ALIGNMENT_BOUNDARY}-byte alignment boundary",
        );
        let capacity = align::align_up(capacity)?;
        let arena = ByteArena::with_allocator(capacity, policy, alloc)?;
        Ok(Self { arena })
    }

    /// Copy `bytes` to the end of the arena, padded with zeros to the
    /// boundary. Returns the (aligned) offset they start at.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, ArenaError> {
        let padded = align::align_up(bytes.len())?;
        let offset = self.arena.reserve(padded)?;
        let region = self.arena.region_mut(offset, padded);
        let (data, padding) = region.split_at_mut(bytes.len());
        data.copy_from_slice(bytes);
        padding.fill(0);
        Ok(offset)
    }

    /// Reserve `size` bytes, consuming `align_up(size)`.
    ///
    /// The reservation's slice is exactly `size` bytes and starts at an
    /// aligned address.
    pub fn append_for_write(&mut self, size: usize) -> Result<Reservation<'_>, ArenaError> {
        let padded = align::align_up(size)?;
        let offset = self.arena.reserve(padded)?;
        Ok(Reservation::new(offset, self.arena.region_mut(offset, size)))
    }

    /// Forget every append. Capacity is kept.
    pub fn discard_all(&mut self) {
        self.arena.discard_all();
    }

    /// Forget the last `align_up(n)` bytes, i.e. what appending `n` bytes
    /// consumed.
    ///
    /// # Panics
    ///
    /// Panics if `align_up(n)` exceeds [`len`](Self::len).
    pub fn discard_last(&mut self, n: usize) {
        let used = self.arena.len();
        match align::checked_align_up(n) {
            Some(padded) if padded <= used => self.arena.discard_last(padded),
            _ => panic!("cannot discard {n} bytes from an aligned arena holding {used}"),
        }
    }

    /// Base address; aligned to [`ALIGNMENT_BOUNDARY`]. Invalidated by
    /// growth, like [`ByteArena::as_ptr`].
    pub fn as_ptr(&self) -> *const u8 {
        self.arena.as_ptr()
    }

    /// Mutable base address. Same validity rules as [`as_ptr`](Self::as_ptr).
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.arena.as_mut_ptr()
    }

    /// The appended bytes, padding included.
    pub fn as_slice(&self) -> &[u8] {
        self.arena.as_slice()
    }

    /// The appended bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.arena.as_mut_slice()
    }

    /// Bytes consumed, padding included. Always a multiple of the boundary.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether nothing is appended.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Number of times the backing allocation has been resized.
    pub fn generation(&self) -> u64 {
        self.arena.generation()
    }

    /// The growth policy in effect, with its maximum rounded to the boundary.
    pub fn policy(&self) -> &GrowthPolicy {
        self.arena.policy()
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut ByteArena<A> {
        &mut self.arena
    }
}

impl<A: RawAllocator> fmt::Debug for AlignedArena<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedArena")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("generation", &self.generation())
            .finish()
    }
}
