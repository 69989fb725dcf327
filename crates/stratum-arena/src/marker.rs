//! In-band frame markers for the stack allocator.
//!
//! Each stack frame ends with one marker slot recording where the frame
//! started. Read backwards from the top of the arena, the markers form a
//! singly linked list of frame boundaries.

use std::mem::size_of;

use stratum_core::align::checked_align_up;

/// The start offset of one stack frame, stored in the frame's last slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrameMarker {
    start: usize,
}

impl FrameMarker {
    /// Encoded width: one `usize` in native byte order.
    const WIDTH: usize = size_of::<usize>();

    /// Bytes a marker occupies in the arena. Rounded through the same
    /// helper as payload sizes, so the slot is itself aligned.
    pub(crate) const SLOT: usize = match checked_align_up(Self::WIDTH) {
        Some(slot) => slot,
        None => panic!("frame marker slot does not fit in usize"),
    };

    pub(crate) fn new(start: usize) -> Self {
        Self { start }
    }

    /// Offset the frame started at; rewinding to it releases the frame.
    pub(crate) fn start(self) -> usize {
        self.start
    }

    /// Encode into a `SLOT`-byte slot, zeroing the unused tail.
    pub(crate) fn write_to(self, slot: &mut [u8]) {
        debug_assert_eq!(slot.len(), Self::SLOT);
        let (word, rest) = slot.split_at_mut(Self::WIDTH);
        word.copy_from_slice(&self.start.to_ne_bytes());
        rest.fill(0);
    }

    /// Decode from a `SLOT`-byte slot.
    pub(crate) fn read_from(slot: &[u8]) -> Self {
        debug_assert_eq!(slot.len(), Self::SLOT);
        let mut word = [0u8; Self::WIDTH];
        word.copy_from_slice(&slot[..Self::WIDTH]);
        Self {
            start: usize::from_ne_bytes(word),
        }
    }
}
