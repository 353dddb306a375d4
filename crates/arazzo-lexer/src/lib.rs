//! Condition lexer - tokenization using logos
//!
//! One token table covers the whole condition language:
//! - `$`-prefixed runtime expressions are single tokens
//!   (`$response.body#/a/b~1c`)
//! - `==`/`!=` compare, `&&`/`||`/`!` combine
//! - strings may use single or double quotes

mod token;

pub use token::*;

use arazzo_ast::Span;
use logos::Logos;

/// Tokenize a condition into a vector of tokens ending with `Eof`
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }

    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}
