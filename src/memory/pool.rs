//! Pooled backend
//!
//! Closures live in slots of a single pool. Each slot carries an intrusive
//! reference count next to its closure:
//! - a slot starts with a count of zero and every [`PoolRef`] acquires it
//! - cloning a [`PoolRef`] acquires, dropping one releases
//! - a stored capture owns one reference of the slot it points at
//!
//! When a count reaches zero the slot is emptied, pushed on the free list and
//! the closure's captures are released in turn. The next allocation reuses the
//! most recently freed slot before growing the pool.
//!
//! Slots store captures as bare indices, so the pool can be read without
//! touching any counts while it is borrowed.

use super::stats::{AllocStats, Ledger};
use super::value::{Closure, Kind, Singletons};
use super::Backend;
use crate::config::BackendKind;
use crate::interpreter::errors::{fatal, Violation};
use crate::logging::targets;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type SlotIndex = u32;

#[derive(Debug, Default)]
struct Slot {
    count: usize,
    closure: Option<Closure<SlotIndex>>, // None while on the free list
}

#[derive(Debug)]
struct Pool {
    slots: RefCell<Vec<Slot>>,
    free: RefCell<Vec<SlotIndex>>,
    reused: Cell<usize>,
    ledger: Rc<Ledger>,
}

impl Pool {
    fn new(ledger: Rc<Ledger>) -> Self {
        Pool {
            slots: RefCell::new(Vec::new()),
            free: RefCell::new(Vec::new()),
            reused: Cell::new(0),
            ledger,
        }
    }

    /// Place a closure in a slot with a count of zero
    fn insert(&self, closure: Closure<SlotIndex>) -> SlotIndex {
        let kind = closure.kind();
        let slot = Slot {
            count: 0,
            closure: Some(closure),
        };

        let mut slots = self.slots.borrow_mut();
        let index = match self.free.borrow_mut().pop() {
            Some(index) => {
                slots[index as usize] = slot;
                self.reused.set(self.reused.get() + 1);
                log::trace!(target: targets::POOL, "Reusing slot {index} for {kind}");
                index
            }
            None => {
                let index = SlotIndex::try_from(slots.len())
                    .unwrap_or_else(|_| fatal(Violation::IndexOverflow { index: slots.len() }));
                slots.push(slot);
                index
            }
        };
        self.ledger.record_alloc(kind);
        index
    }

    fn acquire(&self, index: SlotIndex) {
        self.slots.borrow_mut()[index as usize].count += 1;
    }

    fn release(&self, index: SlotIndex) {
        let emptied = {
            let mut slots = self.slots.borrow_mut();
            let slot = &mut slots[index as usize];
            slot.count -= 1;
            if slot.count == 0 {
                slot.closure.take()
            } else {
                None
            }
        };

        if let Some(closure) = emptied {
            self.free.borrow_mut().push(index);
            self.ledger.record_free(closure.kind());
            match closure {
                Closure::SuccPartial { n } => self.release(n),
                Closure::SuccInner { n, s } => {
                    self.release(n);
                    self.release(s);
                }
                _ => {}
            }
        }
    }

    fn get(&self, index: SlotIndex) -> Closure<SlotIndex> {
        self.slots.borrow()[index as usize]
            .closure
            .unwrap_or_else(|| fatal(Violation::FreedSlot { slot: index }))
    }

    fn count(&self, index: SlotIndex) -> usize {
        self.slots.borrow()[index as usize].count
    }
}

/// Owning handle to a pooled closure
pub struct PoolRef {
    pool: Rc<Pool>,
    index: SlotIndex,
}

impl PoolRef {
    fn acquire(pool: &Rc<Pool>, index: SlotIndex) -> Self {
        pool.acquire(index);
        PoolRef {
            pool: Rc::clone(pool),
            index,
        }
    }

    pub fn kind(&self) -> Kind {
        self.pool.get(self.index).kind()
    }

    /// Current value of the slot's intrusive count
    pub fn owners(&self) -> usize {
        self.pool.count(self.index)
    }

    pub fn slot(&self) -> u32 {
        self.index
    }
}

impl Clone for PoolRef {
    fn clone(&self) -> Self {
        PoolRef::acquire(&self.pool, self.index)
    }
}

impl Drop for PoolRef {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl fmt::Debug for PoolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoolRef(#{} {}, owners={})",
            self.index,
            self.kind(),
            self.owners()
        )
    }
}

/// Slot pool with intrusive reference counts
pub struct Pooled {
    pool: Rc<Pool>,
    singletons: Singletons<PoolRef>,
}

impl Pooled {
    pub fn new() -> Self {
        let pool = Rc::new(Pool::new(Rc::new(Ledger::default())));
        let singletons = Singletons::build(|closure| store(&pool, closure));
        Pooled { pool, singletons }
    }

    /// The ledger recording allocations and frees
    pub fn ledger(&self) -> Rc<Ledger> {
        Rc::clone(&self.pool.ledger)
    }

    /// Slots currently on the free list
    pub fn free_slots(&self) -> usize {
        self.pool.free.borrow().len()
    }
}

impl Default for Pooled {
    fn default() -> Self {
        Self::new()
    }
}

fn store(pool: &Rc<Pool>, closure: Closure<PoolRef>) -> PoolRef {
    // The slot takes its own reference to each capture; the handles passed in
    // release theirs when they go out of scope below
    let indices = closure.map(|capture| {
        pool.acquire(capture.index);
        capture.index
    });
    let index = pool.insert(indices);
    PoolRef::acquire(pool, index)
}

impl Backend for Pooled {
    type Atom = PoolRef;

    const KIND: BackendKind = BackendKind::Pooled;

    fn alloc(&self, closure: Closure<PoolRef>) -> PoolRef {
        store(&self.pool, closure)
    }

    fn resolve(&self, atom: &PoolRef) -> Closure<PoolRef> {
        if !Rc::ptr_eq(&atom.pool, &self.pool) {
            fatal(Violation::ForeignHandle {
                backend: BackendKind::Pooled,
            });
        }
        let closure = self.pool.get(atom.index);
        closure.map(|index| PoolRef::acquire(&self.pool, index))
    }

    fn singletons(&self) -> &Singletons<PoolRef> {
        &self.singletons
    }

    fn same(a: &PoolRef, b: &PoolRef) -> bool {
        Rc::ptr_eq(&a.pool, &b.pool) && a.index == b.index
    }

    fn stats(&self) -> AllocStats {
        let mut stats = self.pool.ledger.snapshot();
        stats.slots = self.pool.slots.borrow().len();
        stats.reused = self.pool.reused.get();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_handles() {
        let backend = Pooled::new();
        let n = backend.alloc(Closure::IntLiteral(2));
        assert_eq!(n.owners(), 1);

        let partial = backend.alloc(Closure::SuccPartial { n: n.clone() });
        assert_eq!(n.owners(), 2);
        assert_eq!(partial.owners(), 1);

        drop(partial);
        assert_eq!(n.owners(), 1);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let backend = Pooled::new();
        let first = backend.alloc(Closure::IntLiteral(1));
        let slot = first.slot();
        drop(first);
        assert_eq!(backend.free_slots(), 1);

        let second = backend.alloc(Closure::IntLiteral(2));
        assert_eq!(second.slot(), slot);
        assert_eq!(backend.resolve(&second).as_int(), Some(2));

        let stats = backend.stats();
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.slots, 5);
    }

    #[test]
    fn test_release_cascades_through_captures() {
        let backend = Pooled::new();
        let inc = backend.singletons().inc.clone();
        let n = backend.alloc(Closure::IntLiteral(0));
        let inner = backend.alloc(Closure::SuccInner { n, s: inc });
        assert_eq!(backend.stats().live(), 6);

        drop(inner);
        let stats = backend.stats();
        assert_eq!(stats.live(), 4);
        assert_eq!(stats.kind(Kind::IntLiteral).free, 1);
        assert_eq!(backend.singletons().inc.owners(), 1);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let backend = Pooled::new();
        let ledger = backend.ledger();
        let kept = backend.alloc(Closure::SuccPartial {
            n: backend.singletons().zero.clone(),
        });

        // The captured zero outlives its singleton handle
        drop(backend);
        assert_eq!(ledger.live(), 2);
        drop(kept);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    #[should_panic(expected = "foreign handle")]
    fn test_handle_from_another_pool_is_fatal() {
        let a = Pooled::new();
        let b = Pooled::new();
        let five = a.alloc(Closure::IntLiteral(5));
        let _seven = b.alloc(Closure::IntLiteral(7));
        b.resolve(&five);
    }
}
