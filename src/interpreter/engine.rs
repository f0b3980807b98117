// Evaluation engine for Church numerals

use crate::interpreter::errors::{fatal, Violation};
use crate::memory::stats::AllocStats;
use crate::memory::value::{Closure, Int, Kind, Singletons};
use crate::memory::{Arena, Backend};

/// Applies closures stored in a backend
///
/// The evaluator owns its backend, so two evaluators never share allocator
/// state and can run side by side.
#[derive(Debug)]
pub struct Evaluator<B: Backend> {
    backend: B,
}

impl<B: Backend> Evaluator<B> {
    pub fn new(backend: B) -> Self {
        Evaluator { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn singletons(&self) -> &Singletons<B::Atom> {
        self.backend.singletons()
    }

    /// `(% s (% z z))`
    pub fn zero(&self) -> B::Atom {
        self.singletons().zero.clone()
    }

    /// `(% z z)`, what `zero` returns when applied
    pub fn zero_inner(&self) -> B::Atom {
        self.singletons().zero_inner.clone()
    }

    /// `(% n (% s (% z s ((n s) z))))`
    pub fn succ(&self) -> B::Atom {
        self.singletons().succ.clone()
    }

    pub fn inc(&self) -> B::Atom {
        self.singletons().inc.clone()
    }

    /// Allocate an integer literal
    pub fn int(&self, value: Int) -> B::Atom {
        self.backend.alloc(Closure::IntLiteral(value))
    }

    pub fn kind(&self, atom: &B::Atom) -> Kind {
        self.backend.resolve(atom).kind()
    }

    /// Whether both handles refer to the same closure
    pub fn same(&self, a: &B::Atom, b: &B::Atom) -> bool {
        B::same(a, b)
    }

    /// Apply `f` to a single argument
    ///
    /// Panics if `f` is an integer literal.
    pub fn apply(&self, f: &B::Atom, arg: &B::Atom) -> B::Atom {
        match self.backend.resolve(f) {
            Closure::Zero => self.zero_inner(),
            Closure::ZeroInner => arg.clone(),
            Closure::Succ => self.backend.alloc(Closure::SuccPartial { n: arg.clone() }),
            Closure::SuccPartial { n } => self.backend.alloc(Closure::SuccInner {
                n,
                s: arg.clone(),
            }),
            Closure::SuccInner { n, s } => {
                // (s ((n s) z))
                let ns = self.apply(&n, &s);
                let nsz = self.apply(&ns, arg);
                self.apply(&s, &nsz)
            }
            Closure::Inc => {
                let value = self.to_int(arg);
                match value.checked_add(1) {
                    Some(next) => self.int(next),
                    None => fatal(Violation::IntegerOverflow { value }),
                }
            }
            Closure::IntLiteral(_) => fatal(Violation::NotApplicable {
                kind: Kind::IntLiteral,
            }),
        }
    }

    /// Coerce an integer literal to its value
    ///
    /// Panics for every other variant.
    pub fn to_int(&self, atom: &B::Atom) -> Int {
        let closure = self.backend.resolve(atom);
        closure
            .as_int()
            .unwrap_or_else(|| fatal(Violation::NotNumeric { kind: closure.kind() }))
    }

    pub fn stats(&self) -> AllocStats {
        self.backend.stats()
    }
}

impl Evaluator<Arena> {
    /// Reclaim every closure at once
    ///
    /// Requires exclusive access; handles created before the reset are stale.
    pub fn reset(&mut self) {
        self.backend.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Pooled, Refcounted};

    #[test]
    fn test_zero_returns_shared_inner() {
        let eval = Evaluator::new(Arena::default());
        let inner = eval.apply(&eval.zero(), &eval.inc());
        assert!(eval.same(&inner, &eval.zero_inner()));
        assert_eq!(eval.kind(&inner), Kind::ZeroInner);
    }

    #[test]
    fn test_zero_inner_is_identity() {
        let eval = Evaluator::new(Refcounted::new());
        let x = eval.int(41);
        let y = eval.apply(&eval.zero_inner(), &x);
        assert!(eval.same(&x, &y));
    }

    #[test]
    fn test_succ_builds_partial_then_inner() {
        let eval = Evaluator::new(Arena::default());
        let partial = eval.apply(&eval.succ(), &eval.zero());
        assert_eq!(eval.kind(&partial), Kind::SuccPartial);

        let inner = eval.apply(&partial, &eval.inc());
        assert_eq!(eval.kind(&inner), Kind::SuccInner);

        let one = eval.apply(&inner, &eval.int(0));
        assert_eq!(eval.to_int(&one), 1);
    }

    #[test]
    fn test_inc_adds_one() {
        let eval = Evaluator::new(Pooled::new());
        let out = eval.apply(&eval.inc(), &eval.int(-3));
        assert_eq!(eval.to_int(&out), -2);
    }

    #[test]
    #[should_panic(expected = "apply(atom) on Int")]
    fn test_apply_int_literal_is_fatal() {
        let eval = Evaluator::new(Arena::default());
        eval.apply(&eval.int(1), &eval.zero());
    }

    #[test]
    #[should_panic(expected = "to_int() on Inc")]
    fn test_inc_to_int_is_fatal() {
        let eval = Evaluator::new(Arena::default());
        eval.to_int(&eval.inc());
    }

    #[test]
    #[should_panic(expected = "integer overflow")]
    fn test_inc_overflow_is_fatal() {
        let eval = Evaluator::new(Arena::default());
        eval.apply(&eval.inc(), &eval.int(Int::MAX));
    }

    #[test]
    fn test_reset_keeps_evaluator_usable() {
        let mut eval = Evaluator::new(Arena::new(256));
        let two = eval.numeral(2);
        assert_eq!(eval.fold(&two), 2);

        eval.reset();
        assert_eq!(eval.backend().epoch(), 1);
        let three = eval.numeral(3);
        assert_eq!(eval.fold(&three), 3);
    }
}
