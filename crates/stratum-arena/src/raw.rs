//! Low-level primitives for arena memory operations.
//!
//! This is the only module in the crate that contains `unsafe`. It
//! defines the allocation capability arenas are built on
//! ([`RawAllocator`]), its default implementation over the Rust global
//! allocator ([`Global`]), and the owned, zero-initialised block every
//! arena stores its bytes in.
//!
//! Each `unsafe` block carries a `// SAFETY:` comment. Everything above
//! this module works with plain byte slices.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;

use stratum_core::{ArenaError, ALIGNMENT_BOUNDARY};

/// The allocation capability an arena consumes.
///
/// Mirrors the classic `malloc`/`realloc`/`free` triple, except that
/// sizes are passed back on reallocation and release so implementations
/// can be built on `Layout`-based allocators.
///
/// # Safety
///
/// Implementations must uphold:
///
/// - A block returned by [`allocate`](Self::allocate) or
///   [`reallocate`](Self::reallocate) is valid for reads and writes of the
///   requested size and aligned to [`ALIGNMENT_BOUNDARY`].
/// - `reallocate` preserves the first `min(old_size, new_size)` bytes on
///   success, and on failure returns `None` leaving the original block and
///   its contents valid and unchanged.
/// - A block stays valid until it is passed to `reallocate` (successfully)
///   or `release`.
pub unsafe trait RawAllocator {
    /// Allocate `size` bytes, or `None` if the request cannot be met.
    ///
    /// Arenas never request zero bytes.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Resize the block at `ptr` from `old_size` to `new_size` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block of `old_size` bytes obtained from this
    /// allocator, and `new_size` must be positive.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>>;

    /// Give the block at `ptr` back to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block of `size` bytes obtained from this
    /// allocator. It must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, size: usize);
}

// SAFETY: forwards every call to the referenced allocator, which upholds
// the trait contract itself.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: the caller's guarantees are passed through unchanged.
        unsafe { (**self).reallocate(ptr, old_size, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: the caller's guarantees are passed through unchanged.
        unsafe { (**self).release(ptr, size) }
    }
}

/// The Rust global allocator, with every block aligned to
/// [`ALIGNMENT_BOUNDARY`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

fn block_layout(size: usize) -> Option<Layout> {
    if size == 0 {
        return None;
    }
    Layout::from_size_align(size, ALIGNMENT_BOUNDARY).ok()
}

// SAFETY: every block is requested with a layout of the exact size and
// ALIGNMENT_BOUNDARY alignment, and `std::alloc::realloc` keeps the old
// block intact when it returns null.
unsafe impl RawAllocator for Global {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let layout = block_layout(size)?;
        // SAFETY: `block_layout` never returns a zero-sized layout.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        let old_layout = block_layout(old_size)?;
        // Rejects sizes that overflow isize once rounded to the alignment.
        block_layout(new_size)?;
        // SAFETY: `ptr` was allocated by this allocator with `old_layout`
        // (caller contract) and `new_size` is non-zero and layout-valid.
        NonNull::new(unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_size) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        if let Some(layout) = block_layout(size) {
            // SAFETY: `ptr` is a live block allocated with this layout.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }
}

/// One owned, fully initialised allocation.
///
/// Every byte below `capacity` is initialised: fresh blocks are zeroed
/// and growth zeroes the new tail. That lets arenas hand out plain `&[u8]`
/// and `&mut [u8]` views of any range below `capacity`.
pub(crate) struct RawBuffer<A: RawAllocator> {
    ptr: NonNull<u8>,
    capacity: usize,
    alloc: A,
}

// SAFETY: the buffer exclusively owns its block; moving it to another
// thread moves that ownership, which is sound if the allocator can move.
unsafe impl<A: RawAllocator + Send> Send for RawBuffer<A> {}

// SAFETY: shared access only ever yields `&[u8]` views of the block.
unsafe impl<A: RawAllocator + Sync> Sync for RawBuffer<A> {}

impl<A: RawAllocator> RawBuffer<A> {
    /// Allocate and zero a block of `capacity` bytes.
    pub(crate) fn new(capacity: usize, alloc: A) -> Result<Self, ArenaError> {
        debug_assert!(capacity > 0);
        let ptr = alloc
            .allocate(capacity)
            .ok_or(ArenaError::AllocationFailed {
                requested: capacity,
            })?;
        // SAFETY: the block is valid for writes of `capacity` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, capacity) };
        Ok(Self {
            ptr,
            capacity,
            alloc,
        })
    }

    /// Resize to `new_capacity` bytes, keeping the contents.
    ///
    /// On failure the buffer is untouched.
    pub(crate) fn grow(&mut self, new_capacity: usize) -> Result<(), ArenaError> {
        debug_assert!(new_capacity > self.capacity);
        // SAFETY: `self.ptr` is our live block of `self.capacity` bytes
        // from `self.alloc`, and `new_capacity` is positive.
        let ptr = unsafe {
            self.alloc
                .reallocate(self.ptr, self.capacity, new_capacity)
        }
        .ok_or(ArenaError::GrowthFailed {
            requested: new_capacity,
            capacity: self.capacity,
        })?;
        // SAFETY: the new block is valid for `new_capacity` bytes; only the
        // tail past the old capacity is uninitialised.
        unsafe {
            ptr.as_ptr()
                .add(self.capacity)
                .write_bytes(0, new_capacity - self.capacity)
        };
        self.ptr = ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The whole block, `capacity` bytes.
    pub(crate) fn bytes(&self) -> &[u8] {
        // SAFETY: the block is live, initialised and `capacity` bytes long;
        // `&self` prevents concurrent mutation.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    /// The whole block, `capacity` bytes, mutably.
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as `bytes`, and `&mut self` makes the view exclusive.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }
}

impl<A: RawAllocator> Drop for RawBuffer<A> {
    fn drop(&mut self) {
        // SAFETY: we own the block and nothing can use it after drop.
        unsafe { self.alloc.release(self.ptr, self.capacity) }
    }
}

impl<A: RawAllocator> fmt::Debug for RawBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
