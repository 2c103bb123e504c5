use std::fmt;

/*
The teacher's `AstPrinter` walked the Lox expression tree with a `Visitor`
to render a parenthesized debug form. This crate only ever prints an
`Expr`, never re-derives other results from a second tree walk, so the
visitor machinery collapses into a plain `Display` impl, the same
parenthesized rendering, now also doubling as the canonical textual form
the solver hashes composite conclusions by (see `crate::solver`).
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    And,
    Or,
    Xor,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::And => "+",
            BinOp::Or => "|",
            BinOp::Xor => "^",
        };
        write!(f, "{symbol}")
    }
}

/// An expression tree: a bare fact, a negation, or a binary connective.
/// Immutable once built, and exclusively owned by the rule that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Fact(char),
    Not(Box<Expr>),
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    pub fn not(e: Expr) -> Expr {
        Expr::Not(Box::new(e))
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Fact(c) => write!(f, "{c}"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

/// A parsed `premise => conclusion` line. A `<=>` line expands at parse
/// time into two `Rule`s (forward then reverse); no biconditional node
/// ever exists in an `Expr`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub premise: Expr,
    pub conclusion: Expr,
    /// 1-based source line, used for trace and diagnostic messages.
    pub line: usize,
}

impl Rule {
    pub fn new(premise: Expr, conclusion: Expr, line: usize) -> Self {
        Self { premise, conclusion, line }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.premise, self.conclusion)
    }
}

/// Every uppercase letter mentioned anywhere in `expr`, used to build the
/// knowledge base's `by_conclusion` index and to validate query/fact
/// references at load time.
pub fn facts_in(expr: &Expr) -> Vec<char> {
    let mut out = Vec::new();
    collect_facts(expr, &mut out);
    out
}

fn collect_facts(expr: &Expr, out: &mut Vec<char>) {
    match expr {
        Expr::Fact(c) => out.push(*c),
        Expr::Not(inner) => collect_facts(inner, out),
        Expr::Binary { left, right, .. } => {
            collect_facts(left, out);
            collect_facts(right, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_precedence_free_fully_parenthesized_form() {
        let expr = Expr::binary(BinOp::Or, Expr::binary(BinOp::And, Expr::Fact('A'), Expr::Fact('B')), Expr::Fact('C'));
        assert_eq!(expr.to_string(), "((A + B) | C)");
    }

    #[test]
    fn facts_in_collects_every_leaf() {
        let expr = Expr::binary(BinOp::Xor, Expr::not(Expr::Fact('A')), Expr::Fact('B'));
        assert_eq!(facts_in(&expr), vec!['A', 'B']);
    }
}
