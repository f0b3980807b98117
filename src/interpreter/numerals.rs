use crate::interpreter::engine::Evaluator;
use crate::memory::value::Int;
use crate::memory::Backend;

impl<B: Backend> Evaluator<B> {
    /// `succ n`
    pub fn successor(&self, n: &B::Atom) -> B::Atom {
        self.apply(&self.succ(), n)
    }

    /// The numeral `k`, built by applying `succ` to `zero` `k` times
    pub fn numeral(&self, k: usize) -> B::Atom {
        (0..k).fold(self.zero(), |n, _| self.successor(&n))
    }

    /// Numerals `0` through `count - 1`, each built from its predecessor
    pub fn numerals(&self, count: usize) -> Vec<B::Atom> {
        let mut table: Vec<B::Atom> = Vec::with_capacity(count);
        for _ in 0..count {
            let next = match table.last() {
                Some(prev) => self.successor(prev),
                None => self.zero(),
            };
            table.push(next);
        }
        table
    }

    /// Observe a numeral as an integer: `((n inc) 0)`
    pub fn fold(&self, n: &B::Atom) -> Int {
        let applied = self.apply(n, &self.inc());
        let counted = self.apply(&applied, &self.int(0));
        self.to_int(&counted)
    }

    /// `base ^ exp`, by applying the exponent numeral to the base numeral
    pub fn pow(&self, base: &B::Atom, exp: &B::Atom) -> Int {
        self.fold(&self.apply(exp, base))
    }

    /// `a + b` as a numeral: `((a succ) b)`
    pub fn plus(&self, a: &B::Atom, b: &B::Atom) -> B::Atom {
        self.apply(&self.apply(a, &self.succ()), b)
    }

    /// `a * b` as a numeral: `((a (b succ)) zero)`
    pub fn mul(&self, a: &B::Atom, b: &B::Atom) -> B::Atom {
        let add_b = self.apply(b, &self.succ());
        self.apply(&self.apply(a, &add_b), &self.zero())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Evaluator;
    use crate::memory::value::Kind;
    use crate::memory::{Arena, Backend};

    #[test]
    fn test_table_matches_numeral() {
        let eval = Evaluator::new(Arena::default());
        let table = eval.numerals(6);
        assert_eq!(table.len(), 6);
        assert!(eval.same(&table[0], &eval.zero()));
        for (k, n) in table.iter().enumerate() {
            assert_eq!(eval.fold(n), k as i64);
            assert_eq!(eval.fold(&eval.numeral(k)), k as i64);
        }
    }

    #[test]
    fn test_numerals_capture_predecessor() {
        let eval = Evaluator::new(Arena::default());
        let table = eval.numerals(3);
        match eval.backend().resolve(&table[2]) {
            crate::memory::value::Closure::SuccPartial { n } => assert!(eval.same(&n, &table[1])),
            other => panic!("Expected Succ.S, got {:?}", other.kind()),
        }
        assert_eq!(eval.kind(&table[1]), Kind::SuccPartial);
    }

    #[test]
    fn test_plus_and_mul() {
        let eval = Evaluator::new(Arena::default());
        let two = eval.numeral(2);
        let three = eval.numeral(3);
        let four = eval.numeral(4);

        assert_eq!(eval.fold(&eval.plus(&two, &three)), 5);
        assert_eq!(eval.fold(&eval.plus(&eval.zero(), &three)), 3);
        assert_eq!(eval.fold(&eval.mul(&three, &four)), 12);
        assert_eq!(eval.fold(&eval.mul(&eval.zero(), &four)), 0);
    }

    #[test]
    fn test_pow_of_zero_exponent() {
        let eval = Evaluator::new(Arena::default());
        assert_eq!(eval.pow(&eval.numeral(5), &eval.zero()), 1);
    }
}
