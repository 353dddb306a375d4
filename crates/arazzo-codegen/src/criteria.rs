//! Success-criterion compilation
//!
//! Each criterion compiles to one or more assertion calls against
//! `jsr:@std/assert`:
//! - `simple`: parsed with the precedence-climbing condition parser. Each
//!   conjunct of a top-level `&&` chain becomes its own assertion, with
//!   non-comparison conjuncts checked by `assert(<operand>)`; a condition
//!   rooted in `||` or `!` becomes one `assert(<boolean>)`.
//! - `regex`: `assertMatch(<context>, new RegExp(/pattern/flags))`.
//! - `jsonpath`: a `JSONPath({ wrap: false, path, json })` query, compared
//!   with the right-hand operand when the condition has a top-level
//!   comparison and with `true` otherwise.

use std::collections::BTreeSet;

use arazzo_ast::{AssertionKind, Expr, Property, Stmt};
use arazzo_document::{CriterionKind, SuccessCriterion};
use arazzo_parser::{has_top_level_comparison, parse_condition, split_comparison, Condition, ConditionKind};
use serde::Serialize;
use tracing::debug;

use crate::lower::{lower_condition, lower_operand, lower_runtime, StepScope};
use crate::{CompileError, DEFAULT_CONTEXT};

/// One compiled check
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub kind: AssertionKind,
    pub actual: Expr,
    /// Absent for [`AssertionKind::Truthy`]
    pub expected: Option<Expr>,
    /// The condition text, reported when the assertion fails
    pub message: String,
}

impl Assertion {
    pub fn call(&self) -> Expr {
        let mut args = vec![self.actual.clone()];
        if let Some(expected) = &self.expected {
            args.push(expected.clone());
        }
        args.push(Expr::string(self.message.as_str()));
        Expr::call(Expr::ident(self.kind.function_name()), args)
    }

    pub fn to_stmt(&self) -> Stmt {
        Stmt::expr(self.call())
    }
}

/// The assertion kinds a program uses, for import selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsedAssertions(BTreeSet<AssertionKind>);

impl UsedAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: AssertionKind) {
        self.0.insert(kind);
    }

    pub fn contains(&self, kind: AssertionKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = AssertionKind> + '_ {
        self.0.iter().copied()
    }

    /// Function names to import, alphabetically
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().map(|k| k.function_name().to_string()).collect();
        names.sort();
        names
    }
}

/// Compile a criterion outside any step
pub fn compile(criterion: &SuccessCriterion, used: &mut UsedAssertions) -> Result<Vec<Assertion>, CompileError> {
    compile_with(criterion, &mut StepScope::detached(), DEFAULT_CONTEXT, used)
}

/// Compile a criterion inside a step. Kinds are only recorded in `used`
/// when compilation succeeds.
pub fn compile_with(
    criterion: &SuccessCriterion,
    scope: &mut StepScope,
    default_context: &str,
    used: &mut UsedAssertions,
) -> Result<Vec<Assertion>, CompileError> {
    let kind = criterion.kind().ok_or_else(|| CompileError::UnsupportedType {
        name: criterion.type_name().to_string(),
    })?;
    let context = criterion.context.as_deref().unwrap_or(default_context);

    let assertions = match kind {
        CriterionKind::Simple => compile_simple(&criterion.condition, scope)?,
        CriterionKind::Regex => vec![compile_regex(&criterion.condition, context, scope)?],
        CriterionKind::JsonPath => vec![compile_jsonpath(&criterion.condition, context, scope)?],
    };

    debug!(
        condition = %criterion.condition,
        kind = ?kind,
        assertions = assertions.len(),
        "compiled success criterion"
    );
    for assertion in &assertions {
        used.insert(assertion.kind);
    }
    Ok(assertions)
}

fn compile_simple(condition: &str, scope: &mut StepScope) -> Result<Vec<Assertion>, CompileError> {
    let tree = parse_condition(condition).map_err(|e| CompileError::condition(condition, e))?;

    let conjuncts = tree.conjuncts();
    let chained = conjuncts.len() > 1;
    conjuncts
        .into_iter()
        .map(|part| match &part.kind {
            ConditionKind::Assertion {
                kind, left, right, message, ..
            } => {
                let actual = lower_condition(left, scope);
                let expected = lower_condition(right, scope);
                Ok(Assertion {
                    kind: *kind,
                    actual,
                    expected: Some(expected),
                    message: message.clone(),
                })
            }
            ConditionKind::Not(_) | ConditionKind::Logical { .. } => Ok(truthy(part, condition, scope)),
            // A bare operand is only accepted as one conjunct of an `&&` chain
            _ if chained => Ok(truthy(part, condition, scope)),
            _ => Err(CompileError::MissingComparison {
                condition: condition.to_string(),
                span: part.span,
            }),
        })
        .collect()
}

fn truthy(part: &Condition, condition: &str, scope: &mut StepScope) -> Assertion {
    Assertion {
        kind: AssertionKind::Truthy,
        actual: lower_condition(part, scope),
        expected: None,
        message: condition.to_string(),
    }
}

const REGEX_FLAGS: &str = "dgimsuvy";

/// Split `/pattern/flags` into its parts; anything else is a bare pattern
pub fn split_regex_literal(text: &str) -> Result<(String, String), CompileError> {
    let invalid = |reason: &str| CompileError::InvalidRegex {
        pattern: text.to_string(),
        reason: reason.to_string(),
    };

    let literal = text
        .strip_prefix('/')
        .and_then(|rest| rest.rfind('/').map(|end| (&rest[..end], &rest[end + 1..])))
        .filter(|(_, flags)| flags.chars().all(|c| REGEX_FLAGS.contains(c)));

    let (pattern, flags) = match literal {
        Some((pattern, flags)) => (pattern, flags),
        None => (text, ""),
    };

    if pattern.is_empty() {
        return Err(invalid("empty pattern"));
    }
    let mut seen = String::new();
    for flag in flags.chars() {
        if seen.contains(flag) {
            return Err(invalid(&format!("duplicate flag '{}'", flag)));
        }
        seen.push(flag);
    }
    Ok((pattern.to_string(), flags.to_string()))
}

fn compile_regex(condition: &str, context: &str, scope: &mut StepScope) -> Result<Assertion, CompileError> {
    let (pattern, flags) = split_regex_literal(condition)?;
    let actual = lower_runtime(context, scope);
    Ok(Assertion {
        kind: AssertionKind::Match,
        actual,
        expected: Some(Expr::new_instance(
            Expr::ident("RegExp"),
            vec![Expr::Regex { pattern, flags }],
        )),
        message: condition.to_string(),
    })
}

fn jsonpath_query(path: &str, json: Expr) -> Expr {
    Expr::call(
        Expr::ident("JSONPath"),
        vec![Expr::Object(vec![
            Property::new("wrap", Expr::bool(false)),
            Property::new("path", Expr::string(path)),
            Property::new("json", json),
        ])],
    )
}

fn compile_jsonpath(condition: &str, context: &str, scope: &mut StepScope) -> Result<Assertion, CompileError> {
    let json = lower_runtime(context, scope);

    if !has_top_level_comparison(condition) {
        return Ok(Assertion {
            kind: AssertionKind::Equals,
            actual: jsonpath_query(condition, json),
            expected: Some(Expr::bool(true)),
            message: condition.to_string(),
        });
    }

    let comparison = split_comparison(condition).map_err(|e| CompileError::condition(condition, e))?;
    let expected = lower_operand(&comparison.right, scope);
    Ok(Assertion {
        kind: comparison.operator.assertion_kind(),
        actual: jsonpath_query(&comparison.left.text(), json),
        expected: Some(expected),
        message: condition.to_string(),
    })
}
