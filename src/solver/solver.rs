use std::collections::{HashMap, HashSet};

use log::{debug, trace as log_trace, warn};

use crate::evaluator::{eval_expr, Lookup, TruthValue};
use crate::knowledge::KnowledgeBase;
use crate::parser::{BinOp, Expr};

/*
The teacher's resolver distinguishes "currently being resolved" (the scope
stack, `Vec<HashMap<String, bool>>`) from "already resolved" (the
interpreter's environment) to catch a variable referencing itself in its
own initializer. Backward-chaining proof search needs exactly the same
split for exactly the same reason: `path` is "currently being proven",
`memo` is "already proven", and collapsing the two would let a cycle
through `path` poison a `memo` entry that a different, cycle-free route
could otherwise have produced a real answer for.
*/

#[derive(Debug, Clone)]
pub enum TraceEvent {
    RuleFired { line: usize, conclusion: String, asserted: Option<bool> },
    Contradiction { var: char, true_lines: Vec<usize>, false_lines: Vec<usize> },
    Cycle { var: char },
}

impl std::fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEvent::RuleFired { line, conclusion, asserted } => match asserted {
                Some(true) => write!(f, "  rule at line {line} fired: {conclusion} (asserted true)"),
                Some(false) => write!(f, "  rule at line {line} fired: {conclusion} (asserted false)"),
                None => write!(f, "  rule at line {line} fired: {conclusion} (no single fact forced)"),
            },
            TraceEvent::Contradiction { var, true_lines, false_lines } => write!(
                f,
                "  contradiction on {var}: true via rule(s) at line {true_lines:?}, false via rule(s) at line {false_lines:?}"
            ),
            TraceEvent::Cycle { var } => write!(f, "  cycle detected while proving {var}"),
        }
    }
}

/// Walks a fired conclusion, distributing the asserted polarity through AND
/// and NOT. OR/XOR children stop the walk: a disjunctive or exclusive-or
/// conclusion does not force any single sub-fact, only the composite as a
/// whole (handled separately via `true_rhs`).
fn collect_assertions(expr: &Expr, polarity: bool, out: &mut Vec<(char, bool)>) {
    match expr {
        Expr::Fact(c) => out.push((*c, polarity)),
        Expr::Not(inner) => collect_assertions(inner, !polarity, out),
        Expr::Binary { op: BinOp::And, left, right } => {
            collect_assertions(left, polarity, out);
            collect_assertions(right, polarity, out);
        }
        Expr::Binary { op: BinOp::Or, .. } | Expr::Binary { op: BinOp::Xor, .. } => {}
    }
}

/// Per-query solver state: `memo`/`path`/`cycles`/`true_rhs` of spec.md §3,
/// discarded after the query completes (construct a fresh `Solver` per
/// query, see `crate::runner::run_queries`).
pub struct Solver<'kb> {
    kb: &'kb KnowledgeBase,
    memo: HashMap<char, TruthValue>,
    path: HashSet<char>,
    cycles: HashSet<char>,
    true_rhs: HashSet<Expr>,
    trace: Vec<TraceEvent>,
}

struct RecLookup<'a, 'kb> {
    solver: &'a mut Solver<'kb>,
}

impl<'a, 'kb> Lookup for RecLookup<'a, 'kb> {
    fn fact(&mut self, var: char) -> TruthValue {
        self.solver.solve(var)
    }

    fn composite(&mut self, expr: &Expr) -> Option<TruthValue> {
        if self.solver.true_rhs.contains(expr) {
            Some(TruthValue::True)
        } else {
            None
        }
    }
}

impl<'kb> Solver<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self {
            kb,
            memo: HashMap::new(),
            path: HashSet::new(),
            cycles: HashSet::new(),
            true_rhs: HashSet::new(),
            trace: Vec::new(),
        }
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    pub fn cycles(&self) -> &HashSet<char> {
        &self.cycles
    }

    /// Resolve `var` per spec.md §4.5's eight-step algorithm.
    pub fn solve(&mut self, var: char) -> TruthValue {
        if self.kb.is_initially_true(var) {
            return TruthValue::True;
        }
        if let Some(&cached) = self.memo.get(&var) {
            return cached;
        }
        if self.path.contains(&var) {
            self.cycles.insert(var);
            self.trace.push(TraceEvent::Cycle { var });
            debug!("cycle detected while proving {var}, breaking with Unknown");
            return TruthValue::Unknown;
        }

        self.path.insert(var);

        let kb = self.kb;
        let mut found_true = false;
        let mut found_false = false;
        let mut any_unknown_premise = false;
        let mut any_ambiguous = false;
        let mut true_lines = Vec::new();
        let mut false_lines = Vec::new();

        for rule in kb.rules_concluding(var) {
            let premise_val = {
                let mut lookup = RecLookup { solver: self };
                eval_expr(&rule.premise, &mut lookup)
            };

            match premise_val {
                TruthValue::False => continue,
                TruthValue::Unknown => {
                    any_unknown_premise = true;
                    continue;
                }
                TruthValue::True => {
                    // Only an OR/XOR-shaped conclusion needs the whole-unit
                    // cache: per step 5c it is the one case that can't set a
                    // per-variable memo entry. A Fact/NOT/AND conclusion
                    // must keep going through solve() on every lookup, or a
                    // variable later found contradictory (and memoized
                    // Unknown) could still be short-circuited to True by a
                    // stale cache entry recorded before the contradiction
                    // was discovered.
                    if matches!(rule.conclusion, Expr::Binary { op: BinOp::Or, .. } | Expr::Binary { op: BinOp::Xor, .. }) {
                        self.true_rhs.insert(rule.conclusion.clone());
                    }

                    let mut assertions = Vec::new();
                    collect_assertions(&rule.conclusion, true, &mut assertions);
                    let asserted = assertions.iter().find(|(c, _)| *c == var).map(|(_, p)| *p);

                    self.trace.push(TraceEvent::RuleFired {
                        line: rule.line,
                        conclusion: rule.conclusion.to_string(),
                        asserted,
                    });
                    log_trace!("rule at line {} fired for {var}: {}", rule.line, rule.conclusion);

                    match asserted {
                        Some(true) => {
                            found_true = true;
                            true_lines.push(rule.line);
                        }
                        Some(false) => {
                            found_false = true;
                            false_lines.push(rule.line);
                        }
                        // `var` is indexed under this rule (it appears
                        // somewhere in the conclusion) but fell under an
                        // OR/XOR ancestor, so no polarity could be
                        // attributed to it specifically.
                        None => any_ambiguous = true,
                    }
                }
            }
        }

        self.path.remove(&var);

        let verdict = if found_true && found_false {
            warn!("contradiction proving {var}: true via {true_lines:?}, false via {false_lines:?}");
            self.trace.push(TraceEvent::Contradiction { var, true_lines, false_lines });
            TruthValue::Unknown
        } else if found_true {
            TruthValue::True
        } else if found_false {
            TruthValue::False
        } else if any_unknown_premise || any_ambiguous {
            TruthValue::Unknown
        } else {
            TruthValue::False
        };

        self.memo.insert(var, verdict);
        verdict
    }
}
