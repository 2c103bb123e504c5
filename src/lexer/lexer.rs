use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use crate::error::EngineError;

/*
The lexer's job mirrors a general-purpose scanner: consume characters from
one logical line, group them into lexemes, and emit a flat token for each.
Unlike a programming-language scanner there is no identifier/keyword table
to speak of, the alphabet is fixed to A-Z plus a handful of connective
symbols, so the lookup table below maps single characters to operators
instead of words to keywords.
*/

static SINGLE_CHAR_OPS: Lazy<HashMap<char, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert('!', TokenKind::Not);
    m.insert('+', TokenKind::And);
    m.insert('|', TokenKind::Or);
    m.insert('^', TokenKind::Xor);
    m.insert('(', TokenKind::LParen);
    m.insert(')', TokenKind::RParen);
    m.insert('?', TokenKind::QueryMark);
    m
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Fact(char),
    Not,
    And,
    Or,
    Xor,
    LParen,
    RParen,
    Implies,
    Iff,
    QueryMark,
    FactsMark,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Fact(c) => write!(f, "{c}"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::And => write!(f, "+"),
            TokenKind::Or => write!(f, "|"),
            TokenKind::Xor => write!(f, "^"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Implies => write!(f, "=>"),
            TokenKind::Iff => write!(f, "<=>"),
            TokenKind::QueryMark => write!(f, "?"),
            TokenKind::FactsMark => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(line_text: &'a str, line: usize) -> Self {
        Self { chars: line_text.chars().collect(), pos: 0, line, tokens: Vec::new(), source: line_text }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        c
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(&mut self) -> Result<(), EngineError> {
        while !self.is_at_end() {
            let c = self.advance();
            match c {
                ' ' | '\t' | '\r' => {}
                'A'..='Z' => self.tokens.push(Token::new(TokenKind::Fact(c), self.line)),
                '<' => self.lex_iff()?,
                '=' => self.lex_equals(),
                c if SINGLE_CHAR_OPS.contains_key(&c) => {
                    self.tokens.push(Token::new(SINGLE_CHAR_OPS[&c], self.line))
                }
                other => {
                    return Err(EngineError::lex(
                        self.line,
                        format!("unexpected character '{other}' in '{}'", self.source),
                    ))
                }
            }
        }
        Ok(())
    }

    fn lex_iff(&mut self) -> Result<(), EngineError> {
        if self.peek() == Some('=') && self.peek_at(1) == Some('>') {
            self.advance();
            self.advance();
            self.tokens.push(Token::new(TokenKind::Iff, self.line));
            Ok(())
        } else {
            Err(EngineError::lex(self.line, "expected '<=>', found stray '<'"))
        }
    }

    fn lex_equals(&mut self) {
        if self.peek() == Some('>') {
            self.advance();
            self.tokens.push(Token::new(TokenKind::Implies, self.line));
        } else {
            self.tokens.push(Token::new(TokenKind::FactsMark, self.line));
        }
    }
}

/// Tokenize a single logical line (comments already stripped by the loader).
/// `<=>` is recognized before `=>` by construction: the two begin scanning
/// at distinct leading characters (`<` vs `=`), so there is no ambiguity to
/// resolve with extra lookahead beyond the two characters each needs.
pub fn lex(line_text: &str, line: usize) -> Result<Vec<Token>, EngineError> {
    let mut lexer = Lexer::new(line_text, line);
    lexer.run()?;
    Ok(lexer.tokens)
}
