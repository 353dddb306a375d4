//! Assertion kinds emitted into generated tests

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical category of a compiled check.
///
/// Each kind maps onto one function exported by `jsr:@std/assert`, which is
/// what the generator imports. The ordering is the order imports are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssertionKind {
    /// Truthiness of a boolean expression: `assert(expr, msg)`
    Truthy,
    Equals,
    NotEquals,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    /// Regular-expression match
    Match,
}

impl AssertionKind {
    /// Name of the `@std/assert` function implementing this kind
    pub fn function_name(&self) -> &'static str {
        match self {
            AssertionKind::Truthy => "assert",
            AssertionKind::Equals => "assertEquals",
            AssertionKind::NotEquals => "assertNotEquals",
            AssertionKind::Less => "assertLess",
            AssertionKind::LessOrEqual => "assertLessOrEqual",
            AssertionKind::Greater => "assertGreater",
            AssertionKind::GreaterOrEqual => "assertGreaterOrEqual",
            AssertionKind::Match => "assertMatch",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssertionKind::Truthy => "truthy",
            AssertionKind::Equals => "equals",
            AssertionKind::NotEquals => "not-equals",
            AssertionKind::Less => "less",
            AssertionKind::LessOrEqual => "less-or-equal",
            AssertionKind::Greater => "greater",
            AssertionKind::GreaterOrEqual => "greater-or-equal",
            AssertionKind::Match => "match",
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
