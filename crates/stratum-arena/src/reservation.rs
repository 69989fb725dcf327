//! Writable regions handed out by `append_for_write` and `alloc`.

use std::ops::{Deref, DerefMut};

/// A freshly reserved region of an arena, ready for the caller to fill.
///
/// The region mutably borrows its arena, so it cannot outlive the next
/// call that might grow (and move) the backing allocation. Its
/// [`offset`](Self::offset) stays valid as an index after the borrow
/// ends, until the bytes are discarded.
///
/// The initial contents are unspecified: zero, or whatever a discarded
/// append left behind.
#[derive(Debug)]
pub struct Reservation<'a> {
    offset: usize,
    bytes: &'a mut [u8],
}

impl<'a> Reservation<'a> {
    pub(crate) fn new(offset: usize, bytes: &'a mut [u8]) -> Self {
        Self { offset, bytes }
    }

    /// Re-express the offset in other units (elements instead of bytes).
    pub(crate) fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    /// Where the region starts, relative to the arena base.
    ///
    /// Measured in the unit of the arena that produced it: bytes for the
    /// byte, aligned and stack arenas, elements for the fixed-stride
    /// builder.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consume the reservation, keeping the mutable slice.
    pub fn into_slice(self) -> &'a mut [u8] {
        self.bytes
    }
}

impl Deref for Reservation<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl DerefMut for Reservation<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.bytes
    }
}
