//! Stratum: growable, offset-addressed memory arenas.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Stratum sub-crates. For most users, adding `stratum` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stratum::prelude::*;
//!
//! // Build a string pool; offsets stay valid across growth.
//! let mut pool = ByteArena::new(16)?;
//! let hello = pool.append(b"hello")?;
//! let world = pool.append(b"world")?;
//! assert_eq!(&pool.as_slice()[world..world + 5], b"world");
//!
//! // Scratch frames released in LIFO order.
//! let mut stack = StackAllocator::new(256)?;
//! stack.alloc(64)?.fill(0xAB);
//! let frame = stack.alloc(32)?.offset();
//! stack.free(1);
//! assert_eq!(stack.alloc(8)?.offset(), frame);
//! # let _ = hello;
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `stratum-arena` | Byte, fixed-stride, aligned and stack arenas; allocator capability |
//! | [`types`] | `stratum-core` | Errors, growth policy, alignment and checked size arithmetic |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arenas and the allocation capability (`stratum-arena`).
///
/// Implement [`arena::RawAllocator`] to back arenas with your own
/// allocation primitives.
pub use stratum_arena as arena;

/// Errors, growth policy and size arithmetic (`stratum-core`).
pub use stratum_core as types;

/// Common imports for typical Stratum usage.
///
/// ```rust
/// use stratum::prelude::*;
/// ```
pub mod prelude {
    // Arenas
    pub use stratum_arena::{
        AlignedArena, ByteArena, FixedStrideBuilder, Reservation, StackAllocator,
    };

    // Configuration and errors
    pub use stratum_core::{ArenaError, GrowthPolicy, ALIGNMENT_BOUNDARY};
}
