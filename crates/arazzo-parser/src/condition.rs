//! Condition tree nodes

use arazzo_ast::{AssertionKind, Span};
use serde::Serialize;

use crate::ConditionError;

/// A parsed condition with its location in the condition text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConditionKind {
    /// Literal value; bare words are string literals
    Literal(ConditionLiteral),

    /// A `$`-prefixed runtime expression, kept as written
    Runtime(String),

    /// `object[index]`
    Index {
        object: Box<Condition>,
        index: Box<Condition>,
    },

    /// `object.property`
    Property {
        object: Box<Condition>,
        property: String,
    },

    /// `!operand`
    Not(Box<Condition>),

    /// `left && right`, `left || right`
    Logical {
        op: LogicalOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },

    /// A comparison, lowered to an assertion call. `message` is the whole
    /// condition text the comparison came from.
    Assertion {
        kind: AssertionKind,
        operator: ComparisonOperator,
        left: Box<Condition>,
        right: Box<Condition>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConditionLiteral {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// The six comparison operators of the condition language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOperator {
    /// Longest spellings first so `<=` is never read as `<`
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Eq,
        ComparisonOperator::Ne,
        ComparisonOperator::Le,
        ComparisonOperator::Ge,
        ComparisonOperator::Lt,
        ComparisonOperator::Gt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn assertion_kind(&self) -> AssertionKind {
        match self {
            ComparisonOperator::Eq => AssertionKind::Equals,
            ComparisonOperator::Ne => AssertionKind::NotEquals,
            ComparisonOperator::Lt => AssertionKind::Less,
            ComparisonOperator::Le => AssertionKind::LessOrEqual,
            ComparisonOperator::Gt => AssertionKind::Greater,
            ComparisonOperator::Ge => AssertionKind::GreaterOrEqual,
        }
    }
}

/// Look up a comparison operator by spelling
pub fn comparison_operator(symbol: &str, span: Span) -> Result<ComparisonOperator, ConditionError> {
    ComparisonOperator::from_symbol(symbol).ok_or_else(|| ConditionError::UnsupportedOperator {
        operator: symbol.to_string(),
        span,
    })
}

impl Condition {
    pub fn new(kind: ConditionKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self.kind, ConditionKind::Assertion { .. })
    }

    /// Split a top-level `&&` chain into its conjuncts, left to right
    pub fn conjuncts(&self) -> Vec<&Condition> {
        match &self.kind {
            ConditionKind::Logical {
                op: LogicalOp::And,
                left,
                right,
            } => {
                let mut parts = left.conjuncts();
                parts.extend(right.conjuncts());
                parts
            }
            _ => vec![self],
        }
    }
}
