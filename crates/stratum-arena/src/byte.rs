//! Growable byte arena.
//!
//! [`ByteArena`] owns one contiguous allocation and appends to its end.
//! Appends return offsets from the arena base; offsets stay valid as
//! indices until the bytes are discarded, while the base address itself
//! may move whenever an append grows the allocation.
//!
//! Growth multiplies the capacity by the policy's growth factor until the
//! request fits, clamped to the policy maximum. Every size computation is
//! checked before it is performed, and a failed growth leaves the arena
//! exactly as it was.

use std::fmt;

use stratum_core::{size, ArenaError, GrowthPolicy, SizeOp};

use crate::raw::{Global, RawAllocator, RawBuffer};
use crate::reservation::Reservation;

/// A growable, offset-addressed byte buffer.
///
/// ```
/// use stratum_arena::ByteArena;
///
/// let mut arena = ByteArena::new(4)?;
/// assert_eq!(arena.append(&[1, 2, 3])?, 0);
/// assert_eq!(arena.append(&[4, 5, 6])?, 3);
/// assert_eq!(arena.capacity(), 8);
/// assert_eq!(arena.as_slice(), &[1, 2, 3, 4, 5, 6]);
/// # Ok::<(), stratum_arena::ArenaError>(())
/// ```
pub struct ByteArena<A: RawAllocator = Global> {
    /// Backing storage; `buf.capacity()` is the arena capacity.
    buf: RawBuffer<A>,
    /// Bytes currently appended. Never exceeds capacity.
    used: usize,
    policy: GrowthPolicy,
    /// Incremented on every growth, i.e. every time the base may move.
    generation: u64,
}

impl ByteArena<Global> {
    /// Create an arena of `capacity` bytes with the default doubling policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_policy(capacity, GrowthPolicy::default())
    }

    /// Create an arena of `capacity` bytes with a custom growth policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the policy is invalid.
    pub fn with_policy(capacity: usize, policy: GrowthPolicy) -> Result<Self, ArenaError> {
        Self::with_allocator(capacity, policy, Global)
    }
}

impl<A: RawAllocator> ByteArena<A> {
    /// Create an arena of `capacity` bytes backed by `alloc`.
    ///
    /// Fails with [`ArenaError::AllocationFailed`] if the allocator refuses
    /// the initial block, or [`SizeOp::Grow`] overflow if `capacity`
    /// exceeds `policy.max_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the policy is invalid.
    pub fn with_allocator(
        capacity: usize,
        policy: GrowthPolicy,
        alloc: A,
    ) -> Result<Self, ArenaError> {
        policy.validate();
        assert!(capacity > 0, "arena capacity must be positive");
        if capacity > policy.max_capacity {
            return Err(ArenaError::overflow(SizeOp::Grow, 0, capacity));
        }
        let buf = RawBuffer::new(capacity, alloc).inspect_err(|err| {
            tracing::warn!(capacity, error = %err, "arena setup failed");
        })?;
        Ok(Self {
            buf,
            used: 0,
            policy,
            generation: 0,
        })
    }

    /// Copy `bytes` to the end of the arena.
    ///
    /// Returns the offset they now start at. An empty slice is a no-op that
    /// returns the current length.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, ArenaError> {
        let offset = self.reserve(bytes.len())?;
        self.region_mut(offset, bytes.len()).copy_from_slice(bytes);
        Ok(offset)
    }

    /// Reserve `size` bytes at the end of the arena for the caller to fill.
    ///
    /// The returned [`Reservation`] borrows the arena, so it cannot be held
    /// across another append.
    pub fn append_for_write(&mut self, size: usize) -> Result<Reservation<'_>, ArenaError> {
        let offset = self.reserve(size)?;
        Ok(Reservation::new(offset, self.region_mut(offset, size)))
    }

    /// Forget every append. Capacity and contents are kept for reuse.
    pub fn discard_all(&mut self) {
        self.used = 0;
    }

    /// Forget the last `n` appended bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`len`](Self::len).
    pub fn discard_last(&mut self, n: usize) {
        assert!(
            n <= self.used,
            "cannot discard {n} bytes from an arena holding {}",
            self.used,
        );
        self.used -= n;
    }

    /// Base address of the arena.
    ///
    /// Invalidated by any later append that grows the arena; compare
    /// [`generation`](Self::generation) before reusing a stored pointer.
    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    /// Mutable base address of the arena. Same validity rules as
    /// [`as_ptr`](Self::as_ptr).
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.buf.as_mut_ptr()
    }

    /// The appended bytes, `len()` long.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf.bytes()[..self.used]
    }

    /// The appended bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let used = self.used;
        &mut self.buf.bytes_mut()[..used]
    }

    /// Number of bytes currently appended.
    pub fn len(&self) -> usize {
        self.used
    }

    /// Whether nothing is appended.
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Bytes that can be appended before the next growth.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Number of times the backing allocation has been resized.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The growth policy in effect.
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Bump `used` by `size`, growing first if needed. Returns the old end.
    pub(crate) fn reserve(&mut self, size: usize) -> Result<usize, ArenaError> {
        let offset = self.used;
        let required = size::add(offset, size, self.policy.max_capacity).inspect_err(|err| {
            tracing::debug!(used = offset, size, error = %err, "append rejected");
        })?;
        if required > self.capacity() {
            self.grow_to_fit(required)?;
        }
        self.used = required;
        Ok(offset)
    }

    /// `len` appended bytes starting at `offset`.
    pub(crate) fn region_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset + len <= self.used);
        &mut self.buf.bytes_mut()[offset..offset + len]
    }

    /// Cut the arena back to `len` bytes.
    pub(crate) fn truncate(&mut self, len: usize) {
        assert!(
            len <= self.used,
            "cannot truncate an arena holding {} bytes to {len}",
            self.used,
        );
        self.used = len;
    }

    fn grow_to_fit(&mut self, required: usize) -> Result<(), ArenaError> {
        let old_capacity = self.capacity();
        let new_capacity = self
            .policy
            .next_capacity(old_capacity, required)
            .inspect_err(|err| {
                tracing::debug!(capacity = old_capacity, required, error = %err, "growth rejected");
            })?;
        self.buf.grow(new_capacity).inspect_err(|err| {
            tracing::warn!(
                capacity = old_capacity,
                requested = new_capacity,
                error = %err,
                "arena growth failed"
            );
        })?;
        self.generation += 1;
        tracing::debug!(
            old_capacity,
            new_capacity,
            required,
            generation = self.generation,
            "arena grew"
        );
        Ok(())
    }
}

impl<A: RawAllocator> fmt::Debug for ByteArena<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArena")
            .field("len", &self.used)
            .field("capacity", &self.capacity())
            .field("generation", &self.generation)
            .finish()
    }
}
