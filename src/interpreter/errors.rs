//! Fatal violations of the evaluator's contract
//!
//! This module defines [`Violation`], which describes every way the core can
//! be misused: applying an integer, coercing a function to an integer,
//! overflowing an integer literal, asking the arena for something it can
//! never provide, or mixing up handles of two backends.
//!
//! None of these are recoverable. Reaching one means the caller built an
//! ill-typed expression or misconfigured a backend, so [`fatal`] logs the
//! violation and panics before any state is mutated.

use crate::config::BackendKind;
use crate::logging::targets;
use crate::memory::value::{Int, Kind};
use std::fmt;

/// Contract violations that halt evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `apply` called on a variant without it
    NotApplicable { kind: Kind },

    /// `to_int` called on a variant without it
    NotNumeric { kind: Kind },

    /// `Inc` applied to the largest representable integer
    IntegerOverflow { value: Int },

    /// Object larger than a whole arena block
    OversizeAllocation { requested: usize, capacity: usize },

    /// Arena handle created before the last reset
    StaleHandle { handle_epoch: u32, arena_epoch: u32 },

    /// Arena handle pointing past the allocated blocks
    DanglingHandle { block: u32, slot: u32 },

    /// Pool handle pointing at a slot on the free list
    FreedSlot { slot: u32 },

    /// Handle resolved by a backend instance other than the one that made it
    ForeignHandle { backend: BackendKind },

    /// Block or slot index that does not fit in a handle
    IndexOverflow { index: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotApplicable { kind } => {
                write!(f, "not implemented: apply(atom) on {}", kind)
            }
            Violation::NotNumeric { kind } => {
                write!(f, "not implemented: to_int() on {}", kind)
            }
            Violation::IntegerOverflow { value } => {
                write!(f, "integer overflow: inc applied to {}", value)
            }
            Violation::OversizeAllocation {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "can't alloc object: size is too big ({} bytes, block capacity is {})",
                    requested, capacity
                )
            }
            Violation::StaleHandle {
                handle_epoch,
                arena_epoch,
            } => {
                write!(
                    f,
                    "stale arena handle: created in epoch {}, arena is at epoch {}",
                    handle_epoch, arena_epoch
                )
            }
            Violation::DanglingHandle { block, slot } => {
                write!(f, "dangling arena handle: block {} slot {}", block, slot)
            }
            Violation::FreedSlot { slot } => {
                write!(f, "pool slot {} used after release", slot)
            }
            Violation::ForeignHandle { backend } => {
                write!(f, "foreign handle: resolved by another {} backend", backend)
            }
            Violation::IndexOverflow { index } => {
                write!(f, "handle index {} does not fit in 32 bits", index)
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Report a violation and halt
#[cold]
#[track_caller]
pub fn fatal(violation: Violation) -> ! {
    log::error!(target: targets::EVALUATOR, "{violation}");
    panic!("{}", violation)
}
