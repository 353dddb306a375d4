//! Precedence-climbing parser implementation

use arazzo_ast::Span;
use arazzo_lexer::{Token, TokenKind};

use crate::{
    comparison_operator, Condition, ConditionError, ConditionKind, ConditionLiteral, LogicalOp,
};

/// Binding power of a binary operator; 0 for anything that is not one
fn precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::OrOr => 1,
        TokenKind::AndAnd => 2,
        TokenKind::EqEq | TokenKind::Ne => 3,
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => 4,
        _ => 0,
    }
}

/// Deepest `(` / `!` nesting accepted before parsing gives up
pub const MAX_NESTING: usize = 64;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => token.clone(),
            None => Token {
                kind: TokenKind::Eof,
                span: Span::point(self.source.len()),
            },
        }
    }

    fn nest(&mut self, span: Span) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ConditionError::TooDeep {
                limit: MAX_NESTING,
                span,
            });
        }
        Ok(())
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    // === Entry point ===

    /// Parse the whole condition; leftover tokens are an error
    pub fn parse_condition(&mut self) -> Result<Condition, ConditionError> {
        let condition = self.parse_expression(0)?;

        match self.peek() {
            TokenKind::Eof => Ok(condition),
            TokenKind::RParen => Err(ConditionError::UnmatchedParen { span: self.span() }),
            TokenKind::Error => Err(self.invalid_character()),
            found => Err(ConditionError::unexpected("operator or end of input", found, self.span())),
        }
    }

    // === Expressions ===

    /// Parse operators binding tighter than `min_precedence`. Equal
    /// precedence stops the loop, which makes every operator left-associative.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<Condition, ConditionError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = self.peek();
            let precedence = precedence(op);
            if precedence == 0 || precedence <= min_precedence {
                break;
            }

            let op_token = self.advance();
            if self.at(TokenKind::Eof) {
                return Err(ConditionError::MissingOperand {
                    side: "right",
                    operator: self.text(&op_token).to_string(),
                    span: op_token.span,
                });
            }
            let right = self.parse_expression(precedence)?;
            left = self.combine(op_token, left, right)?;
        }

        Ok(left)
    }

    fn combine(
        &self,
        op_token: Token,
        left: Condition,
        right: Condition,
    ) -> Result<Condition, ConditionError> {
        let span = left.span.merge(right.span);
        let kind = match op_token.kind {
            TokenKind::AndAnd | TokenKind::OrOr => ConditionKind::Logical {
                op: if op_token.kind == TokenKind::AndAnd {
                    LogicalOp::And
                } else {
                    LogicalOp::Or
                },
                left: Box::new(left),
                right: Box::new(right),
            },
            _ => {
                let operator = comparison_operator(self.text(&op_token), op_token.span)?;
                ConditionKind::Assertion {
                    kind: operator.assertion_kind(),
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    message: self.source.to_string(),
                }
            }
        };
        Ok(Condition::new(kind, span))
    }

    fn parse_unary(&mut self) -> Result<Condition, ConditionError> {
        if self.at(TokenKind::Bang) {
            let start = self.advance().span;
            self.nest(start)?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            let span = start.merge(operand.span);
            return Ok(Condition::new(ConditionKind::Not(Box::new(operand)), span));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Condition, ConditionError> {
        let mut condition = self.parse_primary()?;

        loop {
            if self.at(TokenKind::LBracket) {
                let open = self.advance().span;
                let index = self.parse_index()?;
                if !self.at(TokenKind::RBracket) {
                    return Err(self.missing_delimiter(']', open));
                }
                let end = self.advance().span;
                let span = condition.span.merge(end);
                condition = Condition::new(
                    ConditionKind::Index {
                        object: Box::new(condition),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.at(TokenKind::Dot) {
                self.advance();
                let property = match self.peek() {
                    TokenKind::Ident
                    | TokenKind::Int
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Null => self.advance(),
                    found => {
                        return Err(ConditionError::unexpected("property name", found, self.span()))
                    }
                };
                let span = condition.span.merge(property.span);
                condition = Condition::new(
                    ConditionKind::Property {
                        object: Box::new(condition),
                        property: self.text(&property).to_string(),
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(condition)
    }

    /// The content of `[...]`: a single literal or runtime expression token
    fn parse_index(&mut self) -> Result<Condition, ConditionError> {
        match self.peek() {
            TokenKind::RBracket => Err(ConditionError::unexpected(
                "index",
                TokenKind::RBracket,
                self.span(),
            )),
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Condition, ConditionError> {
        let start = self.span();

        match self.peek() {
            TokenKind::LParen => {
                self.advance();
                if self.at(TokenKind::RParen) {
                    return Err(ConditionError::unexpected("expression", TokenKind::RParen, self.span()));
                }
                self.nest(start)?;
                let inner = self.parse_expression(0)?;
                self.depth -= 1;
                if !self.at(TokenKind::RParen) {
                    return Err(self.missing_delimiter(')', start));
                }
                let end = self.advance().span;
                Ok(Condition::new(inner.kind, start.merge(end)))
            }
            TokenKind::Int => {
                let token = self.advance();
                let text = self.text(&token);
                let value = text.parse::<i64>().map_err(|_| ConditionError::InvalidNumber {
                    text: text.to_string(),
                    span: token.span,
                })?;
                Ok(literal(ConditionLiteral::Int(value), start))
            }
            TokenKind::Float => {
                let token = self.advance();
                let text = self.text(&token);
                let value = text
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| ConditionError::InvalidNumber {
                        text: text.to_string(),
                        span: token.span,
                    })?;
                Ok(literal(ConditionLiteral::Float(value), start))
            }
            TokenKind::String => {
                let token = self.advance();
                let value = unquote(self.text(&token));
                Ok(literal(ConditionLiteral::String(value), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(literal(ConditionLiteral::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(literal(ConditionLiteral::Bool(false), start))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(ConditionLiteral::Null, start))
            }
            TokenKind::Ident => {
                let token = self.advance();
                let word = self.text(&token).to_string();
                Ok(literal(ConditionLiteral::String(word), start))
            }
            TokenKind::Runtime => {
                let token = self.advance();
                let text = self.text(&token).to_string();
                Ok(Condition::new(ConditionKind::Runtime(text), start))
            }
            TokenKind::Error => Err(self.invalid_character()),
            TokenKind::Eof => Err(ConditionError::UnexpectedEnd { span: start }),
            TokenKind::RParen => Err(ConditionError::UnmatchedParen { span: start }),
            found => {
                if let Some(operator) = found.symbol() {
                    return Err(ConditionError::MissingOperand {
                        side: "left",
                        operator: operator.to_string(),
                        span: start,
                    });
                }
                Err(ConditionError::unexpected("operand", found, start))
            }
        }
    }

    fn invalid_character(&self) -> ConditionError {
        let token = self.current();
        ConditionError::InvalidCharacter {
            text: self.text(&token).to_string(),
            span: token.span,
        }
    }

    fn missing_delimiter(&self, delimiter: char, open: Span) -> ConditionError {
        if self.at(TokenKind::Error) {
            return self.invalid_character();
        }
        ConditionError::MissingDelimiter {
            delimiter,
            span: open.merge(self.span()),
        }
    }
}

fn literal(value: ConditionLiteral, span: Span) -> Condition {
    Condition::new(ConditionKind::Literal(value), span)
}

/// Strip the quotes from a string token, resolving backslash escapes in
/// double-quoted strings
fn unquote(text: &str) -> String {
    let quote = text.chars().next().unwrap_or('"');
    let inner = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    if quote == '\'' {
        return inner.to_string();
    }

    let mut result = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}
