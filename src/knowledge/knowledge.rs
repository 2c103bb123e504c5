use std::collections::{HashMap, HashSet};

use crate::parser::{facts_in, Rule};

/*
The teacher's `Environment` is a scope-chain map keyed by variable name,
walked outward on lookup. A knowledge base has no scope chain, rules are
flat and global, but the same "map from name to the things that mention
it" shape generalizes directly into `by_conclusion`: instead of one value
per name, each name maps to every rule whose conclusion could assert
something about it.
*/

/// Rules and initial facts, indexed for backward chaining. Built once by
/// the loader and treated as read-only by the solver.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub initial_true: HashSet<char>,
    pub rules: Vec<Rule>,
    by_conclusion: HashMap<char, Vec<usize>>,
}

impl KnowledgeBase {
    pub fn new(initial_true: HashSet<char>, rules: Vec<Rule>) -> Self {
        let mut by_conclusion: HashMap<char, Vec<usize>> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            let mut seen = HashSet::new();
            for var in facts_in(&rule.conclusion) {
                if seen.insert(var) {
                    by_conclusion.entry(var).or_default().push(idx);
                }
            }
        }
        Self { initial_true, rules, by_conclusion }
    }

    /// Rules whose conclusion expression mentions `var`, in source order.
    pub fn rules_concluding(&self, var: char) -> impl Iterator<Item = &Rule> {
        self.by_conclusion.get(&var).into_iter().flatten().map(move |&idx| &self.rules[idx])
    }

    pub fn is_initially_true(&self, var: char) -> bool {
        self.initial_true.contains(&var)
    }
}
