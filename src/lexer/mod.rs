mod lexer;

pub use lexer::{lex, Token, TokenKind};
