//! Allocation bookkeeping shared by the backends
//!
//! Every backend counts allocations per closure [`Kind`]. The reference-counted
//! strategies also count destructions, through a [`Ledger`] that the closures
//! themselves hold on to, so that a teardown can be audited after the backend
//! is gone.
//!
//! Recording goes through a [`Ledger`], a fixed array of counters indexed by
//! kind. The keyed [`AllocStats`] view is only built when asked for.

use super::value::Kind;
use rustc_hash::FxHashMap;
use std::cell::Cell;

/// Allocation and free counts for one closure kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocFree {
    pub alloc: usize,
    pub free: usize,
}

impl AllocFree {
    pub fn live(&self) -> usize {
        self.alloc.saturating_sub(self.free)
    }
}

/// Snapshot of a backend's memory usage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocStats {
    pub per_kind: FxHashMap<Kind, AllocFree>,
    /// Arena blocks allocated
    pub blocks: usize,
    /// Arena bytes handed out across all blocks
    pub bytes: usize,
    /// Pool slots ever created (high-water mark)
    pub slots: usize,
    /// Pool allocations served from the free list
    pub reused: usize,
}

impl AllocStats {
    pub fn record_alloc(&mut self, kind: Kind) {
        self.per_kind.entry(kind).or_default().alloc += 1;
    }

    pub fn record_free(&mut self, kind: Kind) {
        self.per_kind.entry(kind).or_default().free += 1;
    }

    /// Counts for a single kind (zero if never allocated)
    pub fn kind(&self, kind: Kind) -> AllocFree {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn allocated(&self) -> usize {
        self.per_kind.values().map(|af| af.alloc).sum()
    }

    pub fn freed(&self) -> usize {
        self.per_kind.values().map(|af| af.free).sum()
    }

    /// Objects allocated and not yet destroyed
    pub fn live(&self) -> usize {
        self.allocated().saturating_sub(self.freed())
    }
}

/// Per-kind allocation and free counters
#[derive(Debug, Default)]
pub struct Ledger {
    alloc: [Cell<usize>; Kind::COUNT],
    free: [Cell<usize>; Kind::COUNT],
}

impl Ledger {
    #[inline]
    pub fn record_alloc(&self, kind: Kind) {
        let counter = &self.alloc[kind.index()];
        counter.set(counter.get() + 1);
    }

    #[inline]
    pub fn record_free(&self, kind: Kind) {
        let counter = &self.free[kind.index()];
        counter.set(counter.get() + 1);
    }

    /// Keyed copy of the counters; kinds never seen are left out
    pub fn snapshot(&self) -> AllocStats {
        let mut stats = AllocStats::default();
        for kind in Kind::ALL {
            let af = AllocFree {
                alloc: self.alloc[kind.index()].get(),
                free: self.free[kind.index()].get(),
            };
            if af != AllocFree::default() {
                stats.per_kind.insert(kind, af);
            }
        }
        stats
    }

    pub fn live(&self) -> usize {
        let total = |counters: &[Cell<usize>]| counters.iter().map(Cell::get).sum::<usize>();
        total(&self.alloc).saturating_sub(total(&self.free))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_counts() {
        let mut stats = AllocStats::default();
        stats.record_alloc(Kind::IntLiteral);
        stats.record_alloc(Kind::IntLiteral);
        stats.record_alloc(Kind::SuccInner);
        stats.record_free(Kind::IntLiteral);

        assert_eq!(stats.kind(Kind::IntLiteral), AllocFree { alloc: 2, free: 1 });
        assert_eq!(stats.kind(Kind::Zero), AllocFree::default());
        assert_eq!(stats.allocated(), 3);
        assert_eq!(stats.freed(), 1);
        assert_eq!(stats.live(), 2);
    }

    #[test]
    fn test_ledger_snapshot_is_detached() {
        let ledger = Ledger::default();
        ledger.record_alloc(Kind::Inc);
        let before = ledger.snapshot();
        ledger.record_free(Kind::Inc);

        assert_eq!(before.live(), 1);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_snapshot_skips_unseen_kinds() {
        let ledger = Ledger::default();
        ledger.record_alloc(Kind::SuccInner);
        ledger.record_alloc(Kind::SuccInner);
        ledger.record_free(Kind::Zero);

        let stats = ledger.snapshot();
        assert_eq!(stats.per_kind.len(), 2);
        assert_eq!(stats.kind(Kind::SuccInner), AllocFree { alloc: 2, free: 0 });
        assert_eq!(stats.kind(Kind::Zero), AllocFree { alloc: 0, free: 1 });
        assert_eq!(stats.kind(Kind::Inc), AllocFree::default());
    }
}
