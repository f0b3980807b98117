//! # Introduction
//!
//! lambdacalc evaluates Church numerals represented as closures, on top of
//! interchangeable memory backends, to compare how allocation strategies
//! behave under a purely functional workload.
//!
//! ## Pipeline
//!
//! ```text
//! Singletons → apply chains → Closures in a Backend → fold → Int
//! ```
//!
//! 1. [`memory`]: the closure vocabulary ([`memory::value::Closure`]) and the
//!    backends storing it: [`memory::Arena`], [`memory::Refcounted`] and
//!    [`memory::Pooled`].
//! 2. [`interpreter`]: the [`interpreter::engine::Evaluator`] with `apply`,
//!    `to_int` and the numeral helpers.
//! 3. [`config`]: backend selection and sizing.
//! 4. [`demo`]: workloads and reporting used by the binary; not part of the
//!    stable library API.
//!
//! ## Example
//!
//! ```
//! use lambdacalc::interpreter::engine::Evaluator;
//! use lambdacalc::memory::Refcounted;
//!
//! let eval = Evaluator::new(Refcounted::new());
//! let two = eval.numeral(2);
//! let three = eval.numeral(3);
//! assert_eq!(eval.pow(&two, &three), 8);
//! ```
//!
//! ## Failure model
//!
//! Applying an integer or coercing a function to an integer is a programming
//! error and panics. The only recoverable errors are configuration errors,
//! see [`config::ConfigError`].

pub mod config;
pub mod demo;
pub mod interpreter;
pub mod logging;
pub mod memory;
