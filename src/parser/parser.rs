/*
Unlike the teacher's recursive-descent `Parser`, where precedence is
baked into the call-stack shape of `equality`/`comparison`/`term`/
`factor`/`unary`/`primary`, this parser drives an explicit
precedence/associativity table (see `PRECEDENCE`/`RIGHT_ASSOC` below)
through the shunting-yard algorithm. The token cursor and the
`Result<_, EngineError>`-propagating style of `consume`/`error` is the
same idiom the teacher uses, just applied to an operator-stack walk
instead of a chain of grammar-rule methods.
*/

use crate::error::EngineError;
use crate::lexer::{Token, TokenKind};
use crate::parser::ast::{BinOp, Expr, Rule};

fn precedence(op: TokenKind) -> u8 {
    match op {
        TokenKind::Not => 4,
        TokenKind::And => 3,
        TokenKind::Xor => 2,
        TokenKind::Or => 1,
        _ => unreachable!("precedence() called on a non-operator token"),
    }
}

fn is_right_assoc(op: TokenKind) -> bool {
    matches!(op, TokenKind::Not)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackOp {
    LParen,
    Op(TokenKind),
}

/// Shunting-yard expression parser over one token span containing no
/// `Implies`/`Iff`/`QueryMark`/`FactsMark` tokens.
struct ExprParser<'a> {
    tokens: &'a [Token],
    line: usize,
    output: Vec<Expr>,
    ops: Vec<StackOp>,
    /// true when the next token must begin an operand (a fact, `!`, or `(`);
    /// false when it must be a binary operator or `)`.
    expect_operand: bool,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: &'a [Token], line: usize) -> Self {
        Self { tokens, line, output: Vec::new(), ops: Vec::new(), expect_operand: true }
    }

    fn err(&self, message: impl Into<String>) -> EngineError {
        EngineError::parse(self.line, message)
    }

    fn pop_while_tighter(&mut self, incoming: TokenKind) -> Result<(), EngineError> {
        while let Some(StackOp::Op(top)) = self.ops.last().copied() {
            let tighter = if is_right_assoc(incoming) {
                precedence(top) > precedence(incoming)
            } else {
                precedence(top) >= precedence(incoming)
            };
            if !tighter {
                break;
            }
            self.ops.pop();
            self.materialize(top)?;
        }
        Ok(())
    }

    fn materialize(&mut self, op: TokenKind) -> Result<(), EngineError> {
        match op {
            TokenKind::Not => {
                let operand = self.output.pop().ok_or_else(|| self.err("'!' is missing an operand"))?;
                self.output.push(Expr::not(operand));
            }
            TokenKind::And | TokenKind::Or | TokenKind::Xor => {
                let right = self.output.pop().ok_or_else(|| self.err(format!("'{op}' is missing its right operand")))?;
                let left = self.output.pop().ok_or_else(|| self.err(format!("'{op}' is missing its left operand")))?;
                let binop = match op {
                    TokenKind::And => BinOp::And,
                    TokenKind::Or => BinOp::Or,
                    TokenKind::Xor => BinOp::Xor,
                    _ => unreachable!(),
                };
                self.output.push(Expr::binary(binop, left, right));
            }
            _ => unreachable!("materialize() called on a non-operator token"),
        }
        Ok(())
    }

    fn run(mut self) -> Result<Expr, EngineError> {
        for &token in self.tokens {
            match token.kind {
                TokenKind::Fact(c) => {
                    if !self.expect_operand {
                        return Err(self.err(format!("unexpected fact '{c}', expected an operator")));
                    }
                    self.output.push(Expr::Fact(c));
                    self.expect_operand = false;
                }
                TokenKind::Not => {
                    if !self.expect_operand {
                        return Err(self.err("unexpected '!', expected an operator"));
                    }
                    self.pop_while_tighter(TokenKind::Not)?;
                    self.ops.push(StackOp::Op(TokenKind::Not));
                }
                TokenKind::And | TokenKind::Or | TokenKind::Xor => {
                    if self.expect_operand {
                        return Err(self.err(format!("'{}' is missing its left operand", token.kind)));
                    }
                    self.pop_while_tighter(token.kind)?;
                    self.ops.push(StackOp::Op(token.kind));
                    self.expect_operand = true;
                }
                TokenKind::LParen => {
                    if !self.expect_operand {
                        return Err(self.err("unexpected '(', expected an operator"));
                    }
                    self.ops.push(StackOp::LParen);
                }
                TokenKind::RParen => {
                    if self.expect_operand {
                        return Err(self.err("unexpected ')', expected an expression"));
                    }
                    loop {
                        match self.ops.pop() {
                            Some(StackOp::LParen) => break,
                            Some(StackOp::Op(op)) => self.materialize(op)?,
                            None => return Err(self.err("unbalanced parentheses: no matching '('")),
                        }
                    }
                }
                TokenKind::Implies | TokenKind::Iff | TokenKind::QueryMark | TokenKind::FactsMark => {
                    return Err(self.err(format!("unexpected '{}' inside an expression", token.kind)));
                }
            }
        }

        if self.expect_operand {
            return Err(self.err("expression ends with a dangling operator"));
        }

        while let Some(op) = self.ops.pop() {
            match op {
                StackOp::LParen => return Err(self.err("unbalanced parentheses: missing ')'")),
                StackOp::Op(op) => self.materialize(op)?,
            }
        }

        if self.output.len() != 1 {
            return Err(self.err("expression does not reduce to a single tree (missing operator?)"));
        }
        Ok(self.output.pop().unwrap())
    }
}

/// Parse one token span (no implication/iff/mark tokens) into an `Expr`.
pub fn parse_expr(tokens: &[Token], line: usize) -> Result<Expr, EngineError> {
    if tokens.is_empty() {
        return Err(EngineError::parse(line, "empty expression"));
    }
    ExprParser::new(tokens, line).run()
}

/// Split a rule line's tokens at its single top-level `=>` or `<=>`, parse
/// both sides, and expand a biconditional into two ordinary rules.
pub fn parse_rule_line(tokens: &[Token], line: usize) -> Result<Vec<Rule>, EngineError> {
    let mut depth = 0i32;
    let mut split_at = None;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            TokenKind::Implies | TokenKind::Iff if depth == 0 => {
                if split_at.is_some() {
                    return Err(EngineError::parse(line, "more than one top-level '=>'/'<=>' on this line"));
                }
                split_at = Some(i);
            }
            _ => {}
        }
    }

    let split_at = split_at.ok_or_else(|| EngineError::parse(line, "rule line has no '=>' or '<=>'"))?;
    let connective = tokens[split_at].kind;
    let left_tokens = &tokens[..split_at];
    let right_tokens = &tokens[split_at + 1..];

    if left_tokens.is_empty() {
        return Err(EngineError::parse(line, "rule is missing its left-hand side"));
    }
    if right_tokens.is_empty() {
        return Err(EngineError::parse(line, "rule is missing its right-hand side"));
    }

    let left = parse_expr(left_tokens, line)?;
    let right = parse_expr(right_tokens, line)?;

    match connective {
        TokenKind::Implies => Ok(vec![Rule::new(left, right, line)]),
        TokenKind::Iff => Ok(vec![Rule::new(left.clone(), right.clone(), line), Rule::new(right, left, line)]),
        _ => unreachable!(),
    }
}
