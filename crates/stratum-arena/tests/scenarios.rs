//! Integration test: end-to-end scenarios across the arena layers.

use stratum_arena::{
    AlignedArena, ArenaError, ByteArena, FixedStrideBuilder, GrowthPolicy, SizeOp,
    StackAllocator, ALIGNMENT_BOUNDARY, FRAME_OVERHEAD,
};

#[test]
fn byte_arena_growth_scenario() {
    let mut arena = ByteArena::new(4).unwrap();

    assert_eq!(arena.append(&[1, 2, 3]).unwrap(), 0);
    assert_eq!(arena.len(), 3);
    assert_eq!(arena.capacity(), 4);

    assert_eq!(arena.append(&[4, 5, 6]).unwrap(), 3);
    assert_eq!(arena.len(), 6);
    assert_eq!(arena.capacity(), 8);
    assert_eq!(arena.as_slice(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn stack_reclaims_freed_frame() {
    let mut stack = StackAllocator::new(256).unwrap();
    let first = stack.alloc(10).unwrap().as_ptr();
    let second = stack.alloc(20).unwrap().as_ptr();
    assert_ne!(first, second);
    stack.free(1);
    let third = stack.alloc(5).unwrap().as_ptr();
    assert_eq!(third, second);
    assert_eq!(stack.generation(), 0);
}

#[test]
fn offsets_survive_growth_while_pointers_move() {
    let mut arena = ByteArena::new(8).unwrap();
    let hello = arena.append(b"hello").unwrap();
    let generation = arena.generation();

    for _ in 0..32 {
        arena.append(b"padding padding padding").unwrap();
    }
    assert!(arena.generation() > generation);
    assert_eq!(&arena.as_slice()[hello..hello + 5], b"hello");
}

#[test]
fn string_table_with_stride_index() {
    // Strings in a byte arena, (offset, len) pairs in a stride builder.
    let words = ["alpha", "beta", "", "gamma", "delta"];
    let mut text = ByteArena::new(4).unwrap();
    let mut index = FixedStrideBuilder::new(16, 1).unwrap();

    for word in words {
        let offset = text.append(word.as_bytes()).unwrap();
        let mut entry = [0u8; 16];
        entry[..8].copy_from_slice(&(offset as u64).to_le_bytes());
        entry[8..].copy_from_slice(&(word.len() as u64).to_le_bytes());
        index.append(&entry, 1).unwrap();
    }

    assert_eq!(index.len(), words.len());
    for (entry, word) in index.iter().zip(words) {
        let offset = u64::from_le_bytes(entry[..8].try_into().unwrap()) as usize;
        let len = u64::from_le_bytes(entry[8..].try_into().unwrap()) as usize;
        assert_eq!(&text.as_slice()[offset..offset + len], word.as_bytes());
    }
}

#[test]
fn aligned_records_hold_wide_scalars() {
    let mut arena = AlignedArena::new(1).unwrap();
    let mut offsets = Vec::new();
    for i in 0..20u64 {
        // Odd-sized header byte, then an aligned u64 record.
        arena.append(&[i as u8]).unwrap();
        let mut r = arena.append_for_write(8).unwrap();
        assert_eq!(r.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        r.copy_from_slice(&(i * 1000).to_ne_bytes());
        offsets.push(r.offset());
    }
    assert_eq!(arena.as_ptr() as usize % ALIGNMENT_BOUNDARY, 0);
    for (i, offset) in offsets.into_iter().enumerate() {
        let bytes = &arena.as_slice()[offset..offset + 8];
        assert_eq!(u64::from_ne_bytes(bytes.try_into().unwrap()), i as u64 * 1000);
    }
}

#[test]
fn stack_nested_scopes() {
    let mut stack = StackAllocator::new(64).unwrap();
    stack.alloc(100).unwrap().fill(1);
    let outer = stack.used();

    for round in 0..5u8 {
        for n in 1..=round as usize + 1 {
            stack.alloc(n * 13).unwrap().fill(round);
        }
        stack.free(round as usize + 1);
        assert_eq!(stack.used(), outer);
        assert_eq!(stack.frame_count(), 1);
    }

    assert!(stack.as_slice()[..100].iter().all(|&b| b == 1));
    stack.free(stack.frame_count());
    assert_eq!(stack.used(), 0);
}

#[test]
fn stack_frame_cost_is_payload_plus_overhead() {
    let mut stack = StackAllocator::new(1).unwrap();
    stack.alloc(1).unwrap();
    assert_eq!(stack.used(), ALIGNMENT_BOUNDARY + FRAME_OVERHEAD);
}

#[test]
fn small_policy_exposes_overflow_edges() {
    let policy = GrowthPolicy::new().with_max_capacity(64);
    let mut arena = ByteArena::with_policy(16, policy).unwrap();
    arena.append(&[0; 60]).unwrap();
    assert_eq!(arena.capacity(), 64);
    assert_eq!(
        arena.append(&[0; 5]).unwrap_err(),
        ArenaError::overflow(SizeOp::Add, 60, 5)
    );
    arena.append(&[0; 4]).unwrap();
    assert_eq!(arena.remaining(), 0);
    assert!(arena.append(&[0]).is_err());

    let mut stack = StackAllocator::with_policy(16, policy).unwrap();
    while stack.alloc(1).is_ok() {}
    assert_eq!(stack.used(), 64);
    assert_eq!(stack.frame_count(), 64 / (ALIGNMENT_BOUNDARY + FRAME_OVERHEAD));
}
