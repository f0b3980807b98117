//! Arena backend
//!
//! This module provides bump allocation of closures with:
//! - A chain of fixed-capacity blocks, grown on demand
//! - Byte accounting through each closure's footprint
//! - No individual reclamation: memory only comes back on [`Arena::reset`]
//!
//! # Handles
//!
//! [`ArenaRef`] is an index quadruple (arena, epoch, block, slot). Blocks are
//! never moved or dropped while the epoch lasts, so a handle stays valid for as
//! long as the arena is not reset. Resolving a handle from an earlier epoch, or
//! one made by another arena, is a fatal violation rather than a silent read of
//! unrelated data.

use super::stats::{AllocStats, Ledger};
use super::value::{Closure, Singletons, HEADER_WORD};
use super::Backend;
use crate::config::BackendKind;
use crate::interpreter::errors::{fatal, Violation};
use crate::logging::targets;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(0);

/// Handle into an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaRef {
    arena: u32,
    epoch: u32,
    block: u32,
    slot: u32,
}

impl ArenaRef {
    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }
}

/// A fixed-capacity block of closures
#[derive(Debug)]
struct ArenaBlock {
    closures: Vec<Closure<ArenaRef>>,
    used: usize, // Bytes handed out
}

#[derive(Debug)]
struct ArenaState {
    blocks: Vec<ArenaBlock>, // Last block is the head
    block_capacity: usize,
    id: u32,
    epoch: u32,
    bytes: usize,
    ledger: Ledger,
}

fn handle_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or_else(|_| fatal(Violation::IndexOverflow { index }))
}

impl ArenaState {
    fn new(block_capacity: usize, id: u32, epoch: u32) -> Self {
        ArenaState {
            blocks: Vec::new(),
            block_capacity,
            id,
            epoch,
            bytes: 0,
            ledger: Ledger::default(),
        }
    }

    fn push_block(&mut self) {
        // Smallest closure is one word, so this bounds the closures per block
        self.blocks.push(ArenaBlock {
            closures: Vec::with_capacity(self.block_capacity / HEADER_WORD),
            used: 0,
        });
        log::debug!(
            target: targets::ARENA,
            "Block #{} allocated ({} bytes in use)",
            self.blocks.len(),
            self.bytes
        );
    }

    fn allocate(&mut self, closure: Closure<ArenaRef>) -> ArenaRef {
        let size = closure.footprint();
        if size > self.block_capacity {
            fatal(Violation::OversizeAllocation {
                requested: size,
                capacity: self.block_capacity,
            });
        }

        let fits = self
            .blocks
            .last()
            .is_some_and(|head| head.used + size <= self.block_capacity);
        if !fits {
            self.push_block();
        }

        let block = self.blocks.len() - 1;
        let head = &mut self.blocks[block];
        let slot = head.closures.len();
        head.used += size;
        self.bytes += size;
        self.ledger.record_alloc(closure.kind());
        head.closures.push(closure);

        ArenaRef {
            arena: self.id,
            epoch: self.epoch,
            block: handle_index(block),
            slot: handle_index(slot),
        }
    }

    fn get(&self, atom: &ArenaRef) -> Closure<ArenaRef> {
        if atom.arena != self.id {
            fatal(Violation::ForeignHandle {
                backend: BackendKind::Arena,
            });
        }
        if atom.epoch != self.epoch {
            fatal(Violation::StaleHandle {
                handle_epoch: atom.epoch,
                arena_epoch: self.epoch,
            });
        }
        self.blocks
            .get(atom.block as usize)
            .and_then(|block| block.closures.get(atom.slot as usize))
            .copied()
            .unwrap_or_else(|| {
                fatal(Violation::DanglingHandle {
                    block: atom.block,
                    slot: atom.slot,
                })
            })
    }
}

/// Bump allocator over chained blocks
#[derive(Debug)]
pub struct Arena {
    state: RefCell<ArenaState>,
    singletons: Singletons<ArenaRef>,
}

impl Arena {
    /// Create an arena whose blocks hold `block_capacity` bytes each
    pub fn new(block_capacity: usize) -> Self {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        Self::with_epoch(block_capacity, id, 0)
    }

    fn with_epoch(block_capacity: usize, id: u32, epoch: u32) -> Self {
        let mut state = ArenaState::new(block_capacity, id, epoch);
        let singletons = Singletons::build(|closure| state.allocate(closure));
        Arena {
            state: RefCell::new(state),
            singletons,
        }
    }

    /// Drop every block at once and start a new epoch
    ///
    /// Handles obtained before the reset must not be resolved afterwards.
    pub fn reset(&mut self) {
        let (capacity, id, epoch, bytes) = {
            let state = self.state.get_mut();
            (state.block_capacity, state.id, state.epoch, state.bytes)
        };
        log::info!(
            target: targets::ARENA,
            "Reset after epoch {epoch}, reclaiming {bytes} bytes"
        );
        *self = Self::with_epoch(capacity, id, epoch.wrapping_add(1));
    }

    pub fn epoch(&self) -> u32 {
        self.state.borrow().epoch
    }

    /// Number of blocks in the chain
    pub fn block_count(&self) -> usize {
        self.state.borrow().blocks.len()
    }

    /// Bytes handed out across all blocks
    pub fn bytes_used(&self) -> usize {
        self.state.borrow().bytes
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(crate::config::defaults::BLOCK_CAPACITY)
    }
}

impl Backend for Arena {
    type Atom = ArenaRef;

    const KIND: BackendKind = BackendKind::Arena;

    fn alloc(&self, closure: Closure<ArenaRef>) -> ArenaRef {
        self.state.borrow_mut().allocate(closure)
    }

    fn resolve(&self, atom: &ArenaRef) -> Closure<ArenaRef> {
        self.state.borrow().get(atom)
    }

    fn singletons(&self) -> &Singletons<ArenaRef> {
        &self.singletons
    }

    fn same(a: &ArenaRef, b: &ArenaRef) -> bool {
        a == b
    }

    fn stats(&self) -> AllocStats {
        let state = self.state.borrow();
        let mut stats = state.ledger.snapshot();
        stats.blocks = state.blocks.len();
        stats.bytes = state.bytes;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::{Kind, MAX_FOOTPRINT};

    #[test]
    fn test_singletons_share_first_block() {
        let arena = Arena::new(1024);
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.bytes_used(), 4 * 8);

        let stats = arena.stats();
        assert_eq!(stats.kind(Kind::Zero).alloc, 1);
        assert_eq!(stats.kind(Kind::Inc).alloc, 1);
        assert_eq!(stats.freed(), 0);
    }

    #[test]
    fn test_new_block_when_head_is_full() {
        // Singletons take 32 bytes, leaving 8 in the first block
        let arena = Arena::new(40);
        let first = arena.alloc(Closure::IntLiteral(1));
        assert_eq!(first.block(), 1);
        assert_eq!(arena.block_count(), 2);

        let second = arena.alloc(Closure::IntLiteral(2));
        assert_eq!(second.block(), 1);
        assert_eq!(second.slot(), 1);

        // Earlier blocks stay readable
        assert_eq!(arena.resolve(&arena.singletons().zero), Closure::Zero);
        assert_eq!(arena.resolve(&first), Closure::IntLiteral(1));
        assert_eq!(arena.stats().blocks, 2);
    }

    #[test]
    fn test_exact_fit_stays_in_head_block() {
        // 32 bytes of singletons plus a 16 byte literal fill the block exactly
        let arena = Arena::new(48);
        let first = arena.alloc(Closure::IntLiteral(1));
        assert_eq!(first.block(), 0);
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.bytes_used(), 48);

        let second = arena.alloc(Closure::Zero);
        assert_eq!(second.block(), 1);
        assert_eq!(arena.block_count(), 2);
    }

    #[test]
    fn test_captures_resolve_to_handles() {
        let arena = Arena::new(1024);
        let n = arena.singletons().zero;
        let s = arena.singletons().inc;
        let inner = arena.alloc(Closure::SuccInner { n, s });
        assert_eq!(arena.resolve(&inner), Closure::SuccInner { n, s });
    }

    #[test]
    #[should_panic(expected = "size is too big")]
    fn test_oversize_allocation_is_fatal() {
        let arena = Arena::new(MAX_FOOTPRINT - 8);
        let n = arena.singletons().zero;
        arena.alloc(Closure::SuccInner { n, s: n });
    }

    #[test]
    fn test_reset_starts_new_epoch() {
        let mut arena = Arena::new(64);
        for i in 0..10 {
            arena.alloc(Closure::IntLiteral(i));
        }
        assert!(arena.block_count() > 1);

        arena.reset();
        assert_eq!(arena.epoch(), 1);
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.bytes_used(), 32);
        assert_eq!(arena.resolve(&arena.singletons().succ), Closure::Succ);
    }

    #[test]
    #[should_panic(expected = "stale arena handle")]
    fn test_stale_handle_is_fatal() {
        let mut arena = Arena::new(64);
        let old = arena.alloc(Closure::IntLiteral(3));
        arena.reset();
        arena.resolve(&old);
    }

    #[test]
    #[should_panic(expected = "does not fit in 32 bits")]
    fn test_index_past_u32_is_fatal() {
        handle_index(u32::MAX as usize + 1);
    }

    #[test]
    fn test_index_at_u32_max_is_kept() {
        assert_eq!(handle_index(u32::MAX as usize), u32::MAX);
    }

    #[test]
    fn test_blocks_reserve_their_capacity() {
        let arena = Arena::new(1024);
        let state = arena.state.borrow();
        assert!(state.blocks[0].closures.capacity() >= 1024 / HEADER_WORD);
    }

    #[test]
    #[should_panic(expected = "foreign handle")]
    fn test_handle_from_another_arena_is_fatal() {
        let a = Arena::new(64);
        let b = Arena::new(64);
        let five = a.alloc(Closure::IntLiteral(5));
        b.alloc(Closure::IntLiteral(7));
        b.resolve(&five);
    }

    #[test]
    fn test_reset_keeps_arena_identity() {
        let mut arena = Arena::new(64);
        arena.reset();
        let n = arena.alloc(Closure::IntLiteral(9));
        assert_eq!(arena.resolve(&n).as_int(), Some(9));
    }
}
