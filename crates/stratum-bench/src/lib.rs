//! Benchmark workloads for the Stratum arenas.
//!
//! Every workload is generated from a seed so benchmark runs are
//! comparable across machines and commits:
//!
//! - [`chunk_sizes`]: append sizes for the byte and aligned arenas
//! - [`frame_script`]: interleaved alloc/free operations for the stack
//! - [`fill_byte_arena`]: replay chunk sizes into a fresh arena

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stratum_arena::{ArenaError, ByteArena};

/// One step of a stack allocator workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOp {
    /// Push a frame with this payload size.
    Alloc(usize),
    /// Pop this many frames (never more than are live).
    Free(usize),
}

/// `count` append sizes in `1..=max_size`, deterministic in `seed`.
pub fn chunk_sizes(count: usize, max_size: usize, seed: u64) -> Vec<usize> {
    assert!(max_size > 0, "max_size must be positive");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.next_u64() % max_size as u64) as usize + 1)
        .collect()
}

/// A script of `len` stack operations that never frees more frames than
/// are live and ends with every frame released.
pub fn frame_script(len: usize, max_payload: usize, seed: u64) -> Vec<FrameOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live = 0usize;
    let mut ops = Vec::with_capacity(len + 1);
    for _ in 0..len {
        // Bias towards allocation so the stack actually gets deep.
        if live == 0 || rng.next_u32() % 3 != 0 {
            ops.push(FrameOp::Alloc((rng.next_u64() % (max_payload as u64 + 1)) as usize));
            live += 1;
        } else {
            let n = (rng.next_u64() % live as u64) as usize + 1;
            ops.push(FrameOp::Free(n));
            live -= n;
        }
    }
    if live > 0 {
        ops.push(FrameOp::Free(live));
    }
    ops
}

/// Append a chunk of each size to a new arena with `capacity` bytes.
pub fn fill_byte_arena(capacity: usize, sizes: &[usize]) -> Result<ByteArena, ArenaError> {
    let largest = sizes.iter().copied().max().unwrap_or(0);
    let source = vec![0x5Au8; largest];
    let mut arena = ByteArena::new(capacity)?;
    for &size in sizes {
        arena.append(&source[..size])?;
    }
    Ok(arena)
}
