use std::io::Write;

use prop_expert::{load_program, run_queries, TruthValue};

fn program_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "{contents}").unwrap();
    f
}

fn verdicts(contents: &str) -> Vec<(char, TruthValue)> {
    let file = program_file(contents);
    let program = load_program(file.path()).unwrap();
    program
        .queries
        .iter()
        .map(|&var| {
            let mut solver = prop_expert::Solver::new(&program.kb);
            (var, solver.solve(var))
        })
        .collect()
}

#[test]
fn scenario_a_simple_forward_chain() {
    assert_eq!(verdicts("A => B\nB => C\n=A\n?C\n"), vec![('C', TruthValue::True)]);
}

#[test]
fn scenario_b_closed_world_default_is_false() {
    assert_eq!(verdicts("A => B\n=\n?B\n"), vec![('B', TruthValue::False)]);
}

#[test]
fn scenario_c_disjunctive_conclusion_is_unknown_per_subfact() {
    assert_eq!(
        verdicts("A => B | C\n=A\n?B C\n"),
        vec![('B', TruthValue::Unknown), ('C', TruthValue::Unknown)]
    );
}

#[test]
fn scenario_d_contradiction_resolves_to_unknown() {
    assert_eq!(verdicts("A => B\nA => !B\n=A\n?B\n"), vec![('B', TruthValue::Unknown)]);
}

#[test]
fn scenario_e_cycle_with_no_supporting_fact_is_unknown() {
    // The cycle resolves one rule's premise to Unknown rather than False,
    // so step 7's closed-world branch returns Unknown, not False.
    assert_eq!(verdicts("A => B\nB => A\n=\n?A\n"), vec![('A', TruthValue::Unknown)]);
}

#[test]
fn scenario_f_biconditional_both_directions() {
    assert_eq!(verdicts("A + B <=> C\n=AB\n?C\n"), vec![('C', TruthValue::True)]);
    // The reverse direction C => (A + B) forces both conjuncts once C holds.
    assert_eq!(verdicts("A + B <=> C\n=C\n?A\n"), vec![('A', TruthValue::True)]);
}

#[test]
fn disjunctive_biconditional_does_not_force_either_disjunct() {
    assert_eq!(verdicts("A | B <=> C\n=C\n?A\n"), vec![('A', TruthValue::Unknown)]);
}

#[test]
fn scenario_g_and_binds_tighter_than_or() {
    // A + B | C => D means (A + B) | C => D, so C alone is enough.
    assert_eq!(verdicts("A + B | C => D\n=C\n?D\n"), vec![('D', TruthValue::True)]);
}

#[test]
fn initial_facts_cannot_be_overridden_by_a_rule() {
    assert_eq!(verdicts("A => !B\n=AB\n?B\n"), vec![('B', TruthValue::True)]);
}

#[test]
fn unreachable_variable_with_no_rule_is_false() {
    assert_eq!(verdicts("A => B\n=\n?Z\n"), vec![('Z', TruthValue::False)]);
}

#[test]
fn run_queries_reports_every_queried_variable_in_order() {
    let file = program_file("A => B\nB => C\n=A\n?C B A\n");
    let program = load_program(file.path()).unwrap();
    let mut out = Vec::new();
    run_queries(&program, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let c_pos = text.find("C is True").unwrap();
    let b_pos = text.find("B is True").unwrap();
    let a_pos = text.find("A is True").unwrap();
    assert!(c_pos < b_pos && b_pos < a_pos, "verdicts must appear in query order");
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    assert_eq!(
        verdicts("# a rulebook about A and B\n\nA => B # inline note\n\n=A\n\n?B\n"),
        vec![('B', TruthValue::True)]
    );
}

#[test]
fn contradiction_on_a_dependency_is_not_masked_by_a_stale_composite_cache() {
    assert_eq!(
        verdicts("A => X\nA => !X\nX + B => Z\nX => Z\n=AB\n?Z\n"),
        vec![('Z', TruthValue::Unknown)]
    );
}

#[test]
fn malformed_program_is_rejected_without_panicking() {
    let file = program_file("A & B => C\n=A\n?C\n");
    assert!(load_program(file.path()).is_err());
}
