//! Runtime expression syntax errors

use arazzo_ast::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Something the grammar would have accepted at the failure position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expectation {
    /// A fixed literal such as `$steps.` or `#`
    Literal {
        text: &'static str,
        ignore_case: bool,
    },
    /// A character class, by description
    Class(&'static str),
    /// End of input
    End,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Literal { text, .. } => write!(f, "\"{}\"", text),
            Expectation::Class(description) => f.write_str(description),
            Expectation::End => f.write_str("end of input"),
        }
    }
}

/// Line/column position of a failure (both 1-based, counted in chars)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Byte offset into the expression
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn at(input: &str, offset: usize) -> Self {
        let before = &input[..offset.min(input.len())];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self {
            offset,
            line,
            column,
        }
    }
}

/// E-EXPR-001: the text is not a valid runtime expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {} but {} found.", describe_expected(.expected), describe_found(.found))]
pub struct SyntaxError {
    /// Everything acceptable at the furthest failure position, sorted and de-duplicated
    pub expected: Vec<Expectation>,
    /// The offending character, or `None` at end of input
    pub found: Option<char>,
    pub location: Location,
    pub span: Span,
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        self.span
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        "E-EXPR-001"
    }

    /// Short label for the caret line of a rendered diagnostic
    pub fn label(&self) -> String {
        match self.found {
            Some(c) => format!("unexpected {:?}", c),
            None => "unexpected end of input".to_string(),
        }
    }
}

fn describe_expected(expected: &[Expectation]) -> String {
    let mut descriptions: Vec<String> = expected.iter().map(|e| e.to_string()).collect();
    descriptions.sort();
    descriptions.dedup();

    match descriptions.len() {
        0 => "nothing".to_string(),
        1 => descriptions.remove(0),
        2 => format!("{} or {}", descriptions[0], descriptions[1]),
        n => format!(
            "{}, or {}",
            descriptions[..n - 1].join(", "),
            descriptions[n - 1]
        ),
    }
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{:?}", c.to_string()),
        None => "end of input".to_string(),
    }
}
