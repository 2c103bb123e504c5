use std::fmt;

use crate::parser::{BinOp, Expr};

/// Ternary truth value. `Unknown` is the solver's in-progress state, never a
/// literal a user writes, there is no way to spell it in the input grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TruthValue::True => "True",
            TruthValue::False => "False",
            TruthValue::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

impl TruthValue {
    fn not(self) -> TruthValue {
        match self {
            TruthValue::True => TruthValue::False,
            TruthValue::False => TruthValue::True,
            TruthValue::Unknown => TruthValue::Unknown,
        }
    }

    /// False dominates; otherwise Unknown dominates over True.
    fn and(self, other: TruthValue) -> TruthValue {
        use TruthValue::*;
        match (self, other) {
            (False, _) | (_, False) => False,
            (Unknown, _) | (_, Unknown) => Unknown,
            (True, True) => True,
        }
    }

    /// True dominates; otherwise Unknown dominates over False.
    fn or(self, other: TruthValue) -> TruthValue {
        use TruthValue::*;
        match (self, other) {
            (True, _) | (_, True) => True,
            (Unknown, _) | (_, Unknown) => Unknown,
            (False, False) => False,
        }
    }

    /// Unknown in either operand yields Unknown; otherwise standard XOR.
    fn xor(self, other: TruthValue) -> TruthValue {
        use TruthValue::*;
        match (self, other) {
            (Unknown, _) | (_, Unknown) => Unknown,
            (a, b) => {
                if (a == True) != (b == True) {
                    True
                } else {
                    False
                }
            }
        }
    }
}

/// Resolves a bare fact to its current truth value, recursing into the
/// solver as needed. Also consulted for composite right-hand sides that
/// were proven true as a whole (see `crate::solver`'s `true_rhs` cache).
pub trait Lookup {
    fn fact(&mut self, var: char) -> TruthValue;

    /// Consulted once per sub-expression before falling back to a
    /// structural walk; lets the solver short-circuit a composite
    /// conclusion (e.g. `X | Y`) that was previously proven true whole,
    /// even though neither `X` nor `Y` alone is resolvable.
    fn composite(&mut self, _expr: &Expr) -> Option<TruthValue> {
        None
    }
}

/// Evaluate `expr` under `lookup`. Pure with respect to `expr` itself: all
/// state lives behind `lookup`.
pub fn eval_expr(expr: &Expr, lookup: &mut dyn Lookup) -> TruthValue {
    if let Some(cached) = lookup.composite(expr) {
        return cached;
    }
    match expr {
        Expr::Fact(c) => lookup.fact(*c),
        Expr::Not(inner) => eval_expr(inner, lookup).not(),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, lookup);
            let r = eval_expr(right, lookup);
            match op {
                BinOp::And => l.and(r),
                BinOp::Or => l.or(r),
                BinOp::Xor => l.xor(r),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<char, TruthValue>);
    impl Lookup for Fixed {
        fn fact(&mut self, var: char) -> TruthValue {
            self.0.get(&var).copied().unwrap_or(TruthValue::Unknown)
        }
    }

    fn env(pairs: &[(char, TruthValue)]) -> Fixed {
        Fixed(pairs.iter().copied().collect())
    }

    #[test]
    fn not_involution() {
        let mut e = env(&[('A', TruthValue::True)]);
        let a = Expr::Fact('A');
        let double_not = Expr::not(Expr::not(a.clone()));
        assert_eq!(eval_expr(&a, &mut e), eval_expr(&double_not, &mut e));
    }

    #[test]
    fn and_truth_table() {
        use TruthValue::*;
        let cases = [
            (True, True, True),
            (True, False, False),
            (False, Unknown, False),
            (Unknown, True, Unknown),
            (Unknown, Unknown, Unknown),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.and(b), expected, "{a:?} AND {b:?}");
        }
    }

    #[test]
    fn or_truth_table() {
        use TruthValue::*;
        let cases = [
            (False, False, False),
            (True, False, True),
            (False, Unknown, Unknown),
            (Unknown, True, True),
            (Unknown, Unknown, Unknown),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.or(b), expected, "{a:?} OR {b:?}");
        }
    }

    #[test]
    fn xor_truth_table() {
        use TruthValue::*;
        let cases = [
            (True, True, False),
            (True, False, True),
            (False, False, False),
            (True, Unknown, Unknown),
            (Unknown, Unknown, Unknown),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.xor(b), expected, "{a:?} XOR {b:?}");
        }
    }

    #[test]
    fn composite_override_short_circuits_structural_walk() {
        struct AlwaysTrue;
        impl Lookup for AlwaysTrue {
            fn fact(&mut self, _var: char) -> TruthValue {
                TruthValue::Unknown
            }
            fn composite(&mut self, _expr: &Expr) -> Option<TruthValue> {
                Some(TruthValue::True)
            }
        }
        let expr = Expr::binary(BinOp::Or, Expr::Fact('A'), Expr::Fact('B'));
        assert_eq!(eval_expr(&expr, &mut AlwaysTrue), TruthValue::True);
    }
}
