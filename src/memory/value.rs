//! Closure representation
//!
//! This module defines the [`Closure`] enum, the fixed vocabulary of values the
//! evaluator works with. A closure is generic over the handle type `H` of the
//! backend that stores it, so the same seven cases are shared by every memory
//! strategy.
//!
//! # Closure Variants
//!
//! - [`Closure::Zero`]: `(% s (% z z))`, applying it yields `ZeroInner`
//! - [`Closure::ZeroInner`]: `(% z z)`, the identity
//! - [`Closure::Succ`]: `(% n (% s (% z s ((n s) z))))`
//! - [`Closure::SuccPartial`]: `Succ` applied to `n`
//! - [`Closure::SuccInner`]: `Succ` applied to `n` and `s`
//! - [`Closure::IntLiteral`]: a machine integer, the only numeric variant
//! - [`Closure::Inc`]: maps an integer literal to its successor
//!
//! # Footprint
//!
//! Every variant has a fixed byte footprint, one header word plus one word per
//! captured value. The arena uses it to decide when a block is full.

use std::fmt;

/// Machine integer produced by folding a numeral
pub type Int = i64;

/// Size in bytes of a header or capture word
pub const HEADER_WORD: usize = 8;

/// Footprint of the largest variant (`SuccInner`)
pub const MAX_FOOTPRINT: usize = 3 * HEADER_WORD;

/// A closure whose captures are handles of type `H`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure<H> {
    Zero,
    ZeroInner,
    Succ,
    SuccPartial { n: H },
    SuccInner { n: H, s: H },
    IntLiteral(Int),
    Inc,
}

/// Variant tag of a [`Closure`], without its captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Zero,
    ZeroInner,
    Succ,
    SuccPartial,
    SuccInner,
    IntLiteral,
    Inc,
}

impl Kind {
    pub const COUNT: usize = 7;

    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Zero,
        Kind::ZeroInner,
        Kind::Succ,
        Kind::SuccPartial,
        Kind::SuccInner,
        Kind::IntLiteral,
        Kind::Inc,
    ];

    /// Short name, following the lambda the variant stands for
    pub fn name(self) -> &'static str {
        match self {
            Kind::Zero => "Zero",
            Kind::ZeroInner => "Zero.Z",
            Kind::Succ => "Succ",
            Kind::SuccPartial => "Succ.S",
            Kind::SuccInner => "Succ.S.Z",
            Kind::IntLiteral => "Int",
            Kind::Inc => "Inc",
        }
    }

    /// Position in [`Kind::ALL`], for per-kind counter arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<H> Closure<H> {
    /// Get the variant tag
    pub fn kind(&self) -> Kind {
        match self {
            Closure::Zero => Kind::Zero,
            Closure::ZeroInner => Kind::ZeroInner,
            Closure::Succ => Kind::Succ,
            Closure::SuccPartial { .. } => Kind::SuccPartial,
            Closure::SuccInner { .. } => Kind::SuccInner,
            Closure::IntLiteral(_) => Kind::IntLiteral,
            Closure::Inc => Kind::Inc,
        }
    }

    /// Size in bytes this closure occupies in an arena block
    pub fn footprint(&self) -> usize {
        let words = match self {
            Closure::Zero | Closure::ZeroInner | Closure::Succ | Closure::Inc => 1,
            Closure::SuccPartial { .. } | Closure::IntLiteral(_) => 2,
            Closure::SuccInner { .. } => 3,
        };
        words * HEADER_WORD
    }

    /// Get the integer value, returns None if not an IntLiteral
    pub fn as_int(&self) -> Option<Int> {
        match self {
            Closure::IntLiteral(value) => Some(*value),
            _ => None,
        }
    }

    /// Rebuild the closure with every capture passed through `f`
    pub fn map<T>(self, mut f: impl FnMut(H) -> T) -> Closure<T> {
        match self {
            Closure::Zero => Closure::Zero,
            Closure::ZeroInner => Closure::ZeroInner,
            Closure::Succ => Closure::Succ,
            Closure::SuccPartial { n } => Closure::SuccPartial { n: f(n) },
            Closure::SuccInner { n, s } => Closure::SuccInner { n: f(n), s: f(s) },
            Closure::IntLiteral(value) => Closure::IntLiteral(value),
            Closure::Inc => Closure::Inc,
        }
    }
}

/// The stateless closures every backend allocates once at construction
#[derive(Debug, Clone)]
pub struct Singletons<A> {
    pub zero: A,
    pub zero_inner: A,
    pub succ: A,
    pub inc: A,
}

impl<A> Singletons<A> {
    pub fn build(mut alloc: impl FnMut(Closure<A>) -> A) -> Self {
        Singletons {
            zero: alloc(Closure::Zero),
            zero_inner: alloc(Closure::ZeroInner),
            succ: alloc(Closure::Succ),
            inc: alloc(Closure::Inc),
        }
    }
}
