/*
The teacher's runner keeps the smallest possible surface: read a file or a
REPL line, feed it to the scanner/parser/interpreter pipeline, and track a
couple of error flags. This runner keeps that shape, a file loader plus an
interactive loop, both thin wrappers around the same pipeline a file load
uses, but the pipeline itself now produces a `KnowledgeBase` and answers
queries through a `Solver` rather than executing statements.
*/

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::info;

use crate::error::EngineError;
use crate::knowledge::KnowledgeBase;
use crate::lexer::{lex, TokenKind};
use crate::parser::parse_rule_line;
use crate::solver::Solver;

/// A loaded program: its knowledge base plus the queried variables, in the
/// order they appeared on the query line.
pub struct Program {
    pub kb: KnowledgeBase,
    pub queries: Vec<char>,
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Read `path` through `DecodeReaderBytes` (so a stray non-UTF-8 byte or a
/// BOM doesn't abort the load the way a bare `String::from_utf8` would),
/// strip `#` comments, and classify each remaining line as a rule, the
/// facts line, or the query line. Section order is enforced: rules, then
/// exactly one facts line, then exactly one query line.
pub fn load_program(path: &Path) -> Result<Program, EngineError> {
    let file = File::open(path)
        .map_err(|e| EngineError::input(0, format!("cannot open {}: {e}", path.display())))?;
    let mut decoder = DecodeReaderBytesBuilder::new().encoding(Some(UTF_8)).build(file);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| EngineError::input(0, format!("cannot decode {}: {e}", path.display())))?;

    let mut rules = Vec::new();
    let mut initial_true = HashSet::new();
    let mut queries = Vec::new();
    let mut facts_line_seen = false;
    let mut query_line_seen = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let stripped = strip_comment(raw).trim();
        if stripped.is_empty() {
            continue;
        }

        let tokens = lex(stripped, line_no)?;
        if tokens.is_empty() {
            continue;
        }

        match tokens[0].kind {
            TokenKind::FactsMark => {
                if facts_line_seen {
                    return Err(EngineError::input(line_no, "more than one facts ('=') line"));
                }
                if query_line_seen {
                    return Err(EngineError::input(
                        line_no,
                        "facts ('=') line must come before the query ('?') line",
                    ));
                }
                facts_line_seen = true;
                for token in &tokens[1..] {
                    match token.kind {
                        TokenKind::Fact(c) => {
                            initial_true.insert(c);
                        }
                        other => {
                            return Err(EngineError::input(line_no, format!("unexpected '{other}' on facts line")))
                        }
                    }
                }
            }
            TokenKind::QueryMark => {
                if query_line_seen {
                    return Err(EngineError::input(line_no, "more than one query ('?') line"));
                }
                query_line_seen = true;
                for token in &tokens[1..] {
                    match token.kind {
                        TokenKind::Fact(c) => queries.push(c),
                        other => {
                            return Err(EngineError::input(line_no, format!("unexpected '{other}' on query line")))
                        }
                    }
                }
                if queries.is_empty() {
                    return Err(EngineError::input(line_no, "query line has no variables"));
                }
            }
            _ => {
                if facts_line_seen || query_line_seen {
                    return Err(EngineError::input(
                        line_no,
                        "rule lines must come before the facts and query lines",
                    ));
                }
                rules.extend(parse_rule_line(&tokens, line_no)?);
            }
        }
    }

    if !facts_line_seen {
        return Err(EngineError::input(0, "program has no facts ('=') line"));
    }
    if !query_line_seen {
        return Err(EngineError::input(0, "program has no query ('?') line"));
    }

    info!(
        "loaded {} rule(s), {} initial fact(s), {} quer{}",
        rules.len(),
        initial_true.len(),
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" }
    );

    Ok(Program { kb: KnowledgeBase::new(initial_true, rules), queries })
}

/// Run every query against a freshly-seeded solver and print its trace plus
/// verdict. No solver state is shared across queries.
pub fn run_queries(program: &Program, mut out: impl Write) -> io::Result<()> {
    for &var in &program.queries {
        let mut solver = Solver::new(&program.kb);
        let verdict = solver.solve(var);
        for event in solver.trace() {
            writeln!(out, "{event}")?;
        }
        writeln!(out, "{var} is {verdict}")?;
    }
    Ok(())
}

/// Interactive `+X` / `-X` / `?X...` / `/q` loop over one running knowledge
/// base. Each command rebuilds a fresh `Solver` from the session's current
/// facts, there is no incremental memo invalidation to get wrong.
pub fn run_interactive(mut program: Program, mut input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/q" {
            break;
        }

        if let Some(rest) = line.strip_prefix('+') {
            apply_fact_edit(&mut program, rest, true, &mut out)?;
        } else if let Some(rest) = line.strip_prefix('-') {
            apply_fact_edit(&mut program, rest, false, &mut out)?;
        } else if let Some(rest) = line.strip_prefix('?') {
            run_ad_hoc_query(&program, rest, &mut out)?;
        } else {
            writeln!(out, "unrecognized command: {line}")?;
        }
    }
    Ok(())
}

fn fact_letters(rest: &str) -> Option<Vec<char>> {
    let tokens = lex(rest, 0).ok()?;
    if tokens.is_empty() {
        return None;
    }
    tokens
        .iter()
        .map(|t| match t.kind {
            TokenKind::Fact(c) => Some(c),
            _ => None,
        })
        .collect()
}

fn apply_fact_edit(program: &mut Program, rest: &str, set_true: bool, mut out: impl Write) -> io::Result<()> {
    match fact_letters(rest) {
        Some(letters) => {
            for c in letters {
                if set_true {
                    program.kb.initial_true.insert(c);
                } else {
                    program.kb.initial_true.remove(&c);
                }
            }
            Ok(())
        }
        None => writeln!(out, "expected one or more fact letters after '{}'", if set_true { '+' } else { '-' }),
    }
}

fn run_ad_hoc_query(program: &Program, rest: &str, mut out: impl Write) -> io::Result<()> {
    match fact_letters(rest) {
        Some(letters) => {
            let mut solver = Solver::new(&program.kb);
            for c in letters {
                let verdict = solver.solve(c);
                writeln!(out, "{c} is {verdict}")?;
            }
            Ok(())
        }
        None => writeln!(out, "expected one or more fact letters after '?'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_program(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{contents}").unwrap();
        f
    }

    #[test]
    fn loads_rules_facts_and_queries_in_order() {
        let file = write_program("A + B => C\n# a comment\n=A\n?C\n");
        let program = load_program(file.path()).unwrap();
        assert_eq!(program.kb.rules.len(), 1);
        assert!(program.kb.is_initially_true('A'));
        assert_eq!(program.queries, vec!['C']);
    }

    #[test]
    fn rejects_facts_line_after_query_line() {
        let file = write_program("A => B\n?B\n=A\n");
        assert!(load_program(file.path()).is_err());
    }

    #[test]
    fn rejects_rule_after_facts_line() {
        let file = write_program("=A\nA => B\n?B\n");
        assert!(load_program(file.path()).is_err());
    }

    #[test]
    fn rejects_missing_query_line() {
        let file = write_program("A => B\n=A\n");
        assert!(load_program(file.path()).is_err());
    }

    #[test]
    fn rejects_missing_facts_line() {
        let file = write_program("A => B\n?B\n");
        assert!(load_program(file.path()).is_err());
    }

    #[test]
    fn run_queries_prints_trace_and_verdict() {
        let file = write_program("A => B\n=A\n?B\n");
        let program = load_program(file.path()).unwrap();
        let mut out = Vec::new();
        run_queries(&program, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("B is True"));
    }

    #[test]
    fn interactive_fact_toggle_and_query() {
        let file = write_program("A => B\n=\n?B\n");
        let program = load_program(file.path()).unwrap();
        let input = Cursor::new(b"+A\n?B\n/q\n".to_vec());
        let mut out = Vec::new();
        run_interactive(program, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("B is True"));
    }
}
