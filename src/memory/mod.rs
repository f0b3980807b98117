//! Memory backends for closures
//!
//! This module provides the storage strategies the evaluator can run on:
//! - [`value`]: Closure representation shared by every backend
//! - [`arena`]: Bump allocation over chained blocks, never frees
//! - [`shared`]: Shared ownership through `Rc`, frees eagerly
//! - [`pool`]: Intrusive counts in a slot pool with a free list
//! - [`stats`]: Per-kind allocation bookkeeping
//!
//! # Ownership
//!
//! A closure only ever captures handles that existed before it, since the
//! only way to build a capturing closure is to apply an existing one. Capture
//! graphs are therefore acyclic, which is what lets the counting backends
//! reclaim everything without a cycle collector.
//!
//! # Handles
//!
//! Each backend picks its own handle type ([`Backend::Atom`]). Cloning a
//! handle of a counting backend acquires a reference and dropping it releases
//! one; arena handles are plain indices and `Copy`.

pub mod arena;
pub mod pool;
pub mod shared;
pub mod stats;
pub mod value;

use crate::config::BackendKind;
use stats::AllocStats;
use std::fmt;
use value::{Closure, Singletons};

/// Storage strategy for closures
pub trait Backend {
    /// Handle to a stored closure
    type Atom: Clone + fmt::Debug;

    /// Which strategy this is
    const KIND: BackendKind;

    /// Store a closure and hand back an owning handle
    fn alloc(&self, closure: Closure<Self::Atom>) -> Self::Atom;

    /// Read the closure behind a handle
    fn resolve(&self, atom: &Self::Atom) -> Closure<Self::Atom>;

    /// The stateless closures allocated at construction
    fn singletons(&self) -> &Singletons<Self::Atom>;

    /// Whether two handles refer to the same stored closure
    fn same(a: &Self::Atom, b: &Self::Atom) -> bool;

    /// Current allocation counts
    fn stats(&self) -> AllocStats;
}

pub use arena::{Arena, ArenaRef};
pub use pool::{PoolRef, Pooled};
pub use shared::{Refcounted, Shared};
