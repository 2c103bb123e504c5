mod evaluator;

pub use evaluator::{eval_expr, Lookup, TruthValue};
