//! Condition parse errors

use arazzo_ast::Span;
use arazzo_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of input")]
    UnexpectedEnd { span: Span },

    #[error("unmatched closing parenthesis")]
    UnmatchedParen { span: Span },

    #[error("expected closing '{delimiter}'")]
    MissingDelimiter { delimiter: char, span: Span },

    #[error("invalid character '{text}'")]
    InvalidCharacter { text: String, span: Span },

    #[error("unsupported operator '{operator}'")]
    UnsupportedOperator { operator: String, span: Span },

    #[error("no comparison operator found in condition '{condition}'")]
    MissingComparison { condition: String, span: Span },

    #[error("missing {side} operand for '{operator}'")]
    MissingOperand {
        side: &'static str,
        operator: String,
        span: Span,
    },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("condition nests deeper than {limit} levels")]
    TooDeep { limit: usize, span: Span },
}

impl ConditionError {
    pub fn span(&self) -> Span {
        match self {
            ConditionError::UnexpectedToken { span, .. } => *span,
            ConditionError::UnexpectedEnd { span } => *span,
            ConditionError::UnmatchedParen { span } => *span,
            ConditionError::MissingDelimiter { span, .. } => *span,
            ConditionError::InvalidCharacter { span, .. } => *span,
            ConditionError::UnsupportedOperator { span, .. } => *span,
            ConditionError::MissingComparison { span, .. } => *span,
            ConditionError::MissingOperand { span, .. } => *span,
            ConditionError::InvalidNumber { span, .. } => *span,
            ConditionError::TooDeep { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConditionError::UnexpectedToken { .. } => "E-COND-001",
            ConditionError::UnexpectedEnd { .. } => "E-COND-002",
            ConditionError::UnmatchedParen { .. } => "E-COND-003",
            ConditionError::MissingDelimiter { .. } => "E-COND-004",
            ConditionError::InvalidCharacter { .. } => "E-COND-005",
            ConditionError::UnsupportedOperator { .. } => "E-COND-006",
            ConditionError::MissingComparison { .. } => "E-COND-007",
            ConditionError::MissingOperand { .. } => "E-COND-008",
            ConditionError::InvalidNumber { .. } => "E-COND-009",
            ConditionError::TooDeep { .. } => "E-COND-010",
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return ConditionError::UnexpectedEnd { span };
        }
        ConditionError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
