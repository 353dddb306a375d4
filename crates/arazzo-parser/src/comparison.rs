//! Flat comparison split
//!
//! Splits `left <op> right` on the first comparison operator that sits
//! outside brackets, parentheses, braces and quotes. JSONPath conditions
//! use this form: the left side is an opaque path (which may contain its
//! own filter comparisons) and the right side is a single operand.

use arazzo_ast::Span;
use serde::Serialize;

use crate::{ComparisonOperator, ConditionError, ConditionLiteral};

/// `left <operator> right`, both sides trimmed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCondition {
    pub left: Operand,
    pub operator: ComparisonOperator,
    pub right: Operand,
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    Literal(ConditionLiteral),
    /// Text starting with `$`, kept verbatim
    Runtime(String),
}

impl Operand {
    /// The operand as it was written (quotes dropped for strings)
    pub fn text(&self) -> String {
        match self {
            Operand::Runtime(text) => text.clone(),
            Operand::Literal(ConditionLiteral::Int(n)) => n.to_string(),
            Operand::Literal(ConditionLiteral::Float(f)) => f.to_string(),
            Operand::Literal(ConditionLiteral::String(s)) => s.clone(),
            Operand::Literal(ConditionLiteral::Bool(b)) => b.to_string(),
            Operand::Literal(ConditionLiteral::Null) => "null".to_string(),
        }
    }
}

/// A comparison operator found at nesting depth zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorMatch {
    pub operator: ComparisonOperator,
    pub span: Span,
}

/// Find the first comparison operator outside `()`, `[]`, `{}` and quotes
pub fn find_top_level_comparison(text: &str) -> Option<OperatorMatch> {
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' | '!' | '<' | '>' if depth == 0 => {
                let rest = &text[i..];
                if let Some(operator) = ComparisonOperator::ALL
                    .into_iter()
                    .find(|op| rest.starts_with(op.symbol()))
                {
                    return Some(OperatorMatch {
                        operator,
                        span: Span::new(i, i + operator.symbol().len()),
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `text` contains a comparison at nesting depth zero
pub fn has_top_level_comparison(text: &str) -> bool {
    find_top_level_comparison(text).is_some()
}

/// Split a condition on its first top-level comparison operator
pub fn split_comparison(text: &str) -> Result<ComparisonCondition, ConditionError> {
    let found = find_top_level_comparison(text).ok_or_else(|| ConditionError::MissingComparison {
        condition: text.to_string(),
        span: Span::new(0, text.len()),
    })?;

    let symbol = found.operator.symbol();
    let left = text[..found.span.start].trim();
    let right = text[found.span.end..].trim();

    if left.is_empty() {
        return Err(ConditionError::MissingOperand {
            side: "left",
            operator: symbol.to_string(),
            span: found.span,
        });
    }
    if right.is_empty() {
        return Err(ConditionError::MissingOperand {
            side: "right",
            operator: symbol.to_string(),
            span: found.span,
        });
    }

    Ok(ComparisonCondition {
        left: parse_operand(left),
        operator: found.operator,
        right: parse_operand(right),
    })
}

/// Classify trimmed operand text: runtime expression when it starts with
/// `$`, otherwise a literal. Unquoted words that are not numbers or
/// keywords are strings.
pub fn parse_operand(text: &str) -> Operand {
    let text = text.trim();
    if text.starts_with('$') {
        return Operand::Runtime(text.to_string());
    }

    let literal = match text {
        "true" => ConditionLiteral::Bool(true),
        "false" => ConditionLiteral::Bool(false),
        "null" => ConditionLiteral::Null,
        _ => {
            if let Some(inner) = strip_quotes(text) {
                ConditionLiteral::String(inner.to_string())
            } else if let Ok(n) = text.parse::<i64>() {
                ConditionLiteral::Int(n)
            } else if let Some(f) = parse_float(text) {
                ConditionLiteral::Float(f)
            } else {
                ConditionLiteral::String(text.to_string())
            }
        }
    };
    Operand::Literal(literal)
}

fn strip_quotes(text: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

fn parse_float(text: &str) -> Option<f64> {
    let looks_numeric = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}
