//! Core types for the Stratum arena family.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pieces every arena layer shares: the error enum, the growth
//! policy, the platform alignment boundary, and the checked size
//! arithmetic that guards every computation which could wrap.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod align;
pub mod config;
pub mod error;
pub mod size;

pub use align::ALIGNMENT_BOUNDARY;
pub use config::GrowthPolicy;
pub use error::{ArenaError, SizeOp};
