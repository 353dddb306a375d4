//! Success-criterion compilation errors

use arazzo_ast::Span;
use arazzo_parser::ConditionError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("invalid condition '{condition}': {source}")]
    Condition {
        condition: String,
        #[source]
        source: ConditionError,
    },

    #[error("condition '{condition}' has no comparison to assert")]
    MissingComparison { condition: String, span: Span },

    #[error("unsupported success criterion type '{name}'")]
    UnsupportedType { name: String },

    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
}

impl CompileError {
    pub fn condition(condition: &str, source: ConditionError) -> Self {
        CompileError::Condition {
            condition: condition.to_string(),
            source,
        }
    }

    /// Location inside the condition text, when there is one
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Condition { source, .. } => Some(source.span()),
            CompileError::MissingComparison { span, .. } => Some(*span),
            CompileError::UnsupportedType { .. } | CompileError::InvalidRegex { .. } => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Condition { source, .. } => source.code(),
            CompileError::MissingComparison { .. } => "E-CRIT-001",
            CompileError::UnsupportedType { .. } => "E-CRIT-002",
            CompileError::InvalidRegex { .. } => "E-CRIT-003",
        }
    }
}
