//! Church numeral evaluation
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`Evaluator`](engine::Evaluator), `apply` and `to_int`
//! - [`numerals`]: Numeral construction, folding and arithmetic
//! - [`errors`]: Fatal contract violations
//!
//! # Execution Model
//!
//! There is no separate interpreter loop. Computation is nothing but nested
//! `apply` calls, each consuming one argument and producing one closure, and
//! a result is observed by folding it with `inc` and `0`.
//!
//! # Recursion
//!
//! Applying a successor closure recurses into its predecessor, so stack depth
//! grows with the magnitude of the numeral being folded.

pub mod engine;
pub mod errors;
pub mod numerals;
