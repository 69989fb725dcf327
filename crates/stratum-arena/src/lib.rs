//! Growable, offset-addressed memory arenas for Stratum.
//!
//! Builds contiguous byte regions (strings, records, arrays) without a
//! heap allocation per element, plus a stack-discipline allocator on top.
//! This crate is the only one in the workspace that contains `unsafe`
//! code, and all of it lives in [`raw`].
//!
//! # Architecture
//!
//! Each layer is built on the one below and forwards a byte request to
//! the [`ByteArena`], which owns the single real allocation:
//!
//! ```text
//! StackAllocator   frames = aligned payload + in-band FrameMarker
//! └── AlignedArena every size rounded to ALIGNMENT_BOUNDARY
//!     └── ByteArena  append / append_for_write / discard, growth
//!         └── RawBuffer<A: RawAllocator>  one zeroed block
//!
//! FixedStrideBuilder  element counts × stride
//! └── ByteArena
//! ```
//!
//! # Offsets and pointers
//!
//! Appends return offsets from the arena base. Offsets are stable indices
//! until discarded; the base address is not, since growth may move the
//! block. Slices handed out borrow the arena, so the borrow checker
//! rejects holding them across a growth-capable call. Raw base pointers
//! can be checked against [`ByteArena::generation`], which changes
//! exactly when the block is resized.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod aligned;
pub mod byte;
mod marker;
pub mod raw;
pub mod reservation;
pub mod stack;
pub mod stride;

// Public re-exports for the primary API surface.
pub use aligned::AlignedArena;
pub use byte::ByteArena;
pub use raw::{Global, RawAllocator};
pub use reservation::Reservation;
pub use stack::{StackAllocator, FRAME_OVERHEAD};
pub use stride::FixedStrideBuilder;
pub use stratum_core::{ArenaError, GrowthPolicy, SizeOp, ALIGNMENT_BOUNDARY};
