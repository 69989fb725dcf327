//! Failure-injecting allocators shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::ptr::NonNull;

use stratum_arena::{Global, RawAllocator};

/// Delegates to [`Global`] but refuses requests on demand.
///
/// - `refuse_allocate`: every `allocate` fails.
/// - `growths_before_failure`: `reallocate` succeeds this many times, then
///   fails until re-armed.
///
/// Also counts live blocks so tests can check nothing leaks.
#[derive(Default)]
pub struct FlakyAlloc {
    pub refuse_allocate: Cell<bool>,
    pub growths_before_failure: Cell<Option<usize>>,
    pub live_blocks: Cell<usize>,
    pub reallocations: Cell<usize>,
}

impl FlakyAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every allocation.
    pub fn refusing() -> Self {
        let alloc = Self::default();
        alloc.refuse_allocate.set(true);
        alloc
    }

    /// Let `n` more growths succeed, then fail the rest.
    pub fn fail_growth_after(&self, n: usize) {
        self.growths_before_failure.set(Some(n));
    }

    /// Stop failing growths.
    pub fn heal(&self) {
        self.growths_before_failure.set(None);
    }
}

unsafe impl RawAllocator for FlakyAlloc {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if self.refuse_allocate.get() {
            return None;
        }
        let ptr = Global.allocate(size)?;
        self.live_blocks.set(self.live_blocks.get() + 1);
        Some(ptr)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        match self.growths_before_failure.get() {
            Some(0) => return None,
            Some(n) => self.growths_before_failure.set(Some(n - 1)),
            None => {}
        }
        self.reallocations.set(self.reallocations.get() + 1);
        unsafe { Global.reallocate(ptr, old_size, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: usize) {
        self.live_blocks.set(self.live_blocks.get() - 1);
        unsafe { Global.release(ptr, size) }
    }
}
