//! Token definitions for success-criteria conditions

use logos::Logos;
use serde::Serialize;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // === Keywords ===
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(".")]
    Dot,

    // === Literals ===
    /// `$statusCode`, `$response.body#/robotId`, `$steps.a.outputs.b`
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_\-]+|#(/[A-Za-z0-9_\-~]*)*)*")]
    Runtime,

    #[regex(r"[0-9]+", priority = 2)]
    Int,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'[^']*'")]
    String,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    /// The operator's source spelling, for binary operators
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Dot => "'.'",
            TokenKind::Runtime => "runtime expression",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Error => "invalid character",
            TokenKind::Eof => "end of input",
        }
    }
}
