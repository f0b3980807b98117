//! Reference-counted backend
//!
//! Every closure lives in its own `Rc` node and owns its captures through
//! [`Shared`] handles. Cloning a handle acquires a reference, dropping it
//! releases one; the node is destroyed when the last owner lets go, which in
//! turn releases everything it captured.
//!
//! Each node also holds the backend's [`Ledger`] so destructions are counted
//! even after the [`Refcounted`] value itself has been dropped.

use super::stats::{AllocStats, Ledger};
use super::value::{Closure, Kind, Singletons};
use super::Backend;
use crate::config::BackendKind;
use crate::logging::targets;
use std::fmt;
use std::rc::Rc;

struct Node {
    closure: Closure<Shared>,
    ledger: Rc<Ledger>,
}

impl Drop for Node {
    fn drop(&mut self) {
        self.ledger.record_free(self.closure.kind());
    }
}

/// Owning handle to a reference-counted closure
#[derive(Clone)]
pub struct Shared(Rc<Node>);

impl Shared {
    fn new(closure: Closure<Shared>, ledger: &Rc<Ledger>) -> Self {
        ledger.record_alloc(closure.kind());
        Shared(Rc::new(Node {
            closure,
            ledger: Rc::clone(ledger),
        }))
    }

    pub fn kind(&self) -> Kind {
        self.0.closure.kind()
    }

    /// Number of owners currently holding this closure
    pub fn owners(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Captures are left out, printing them would walk the whole graph
        write!(f, "Shared({}, owners={})", self.kind(), self.owners())
    }
}

/// Shared-ownership backend with eager reclamation
pub struct Refcounted {
    ledger: Rc<Ledger>,
    singletons: Singletons<Shared>,
}

impl Refcounted {
    pub fn new() -> Self {
        let ledger = Rc::new(Ledger::default());
        let singletons = Singletons::build(|closure| Shared::new(closure, &ledger));
        log::trace!(target: targets::REFCOUNT, "Singletons allocated");
        Refcounted { ledger, singletons }
    }

    /// The ledger recording allocations and frees
    ///
    /// It stays usable after the backend is dropped, for auditing a teardown.
    pub fn ledger(&self) -> Rc<Ledger> {
        Rc::clone(&self.ledger)
    }
}

impl Default for Refcounted {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Refcounted {
    type Atom = Shared;

    const KIND: BackendKind = BackendKind::Refcounted;

    fn alloc(&self, closure: Closure<Shared>) -> Shared {
        Shared::new(closure, &self.ledger)
    }

    fn resolve(&self, atom: &Shared) -> Closure<Shared> {
        atom.0.closure.clone()
    }

    fn singletons(&self) -> &Singletons<Shared> {
        &self.singletons
    }

    fn same(a: &Shared, b: &Shared) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    fn stats(&self) -> AllocStats {
        self.ledger.snapshot()
    }
}
