//! Lowering of access descriptors, condition trees and JSON values into
//! target expressions
//!
//! Inside a generated step these names are bound:
//! - `response`: the fetch response
//! - `data`: the decoded response body
//! - `payload`: the request body, only when the step sends one
//! - `context`: the per-test context store

use arazzo_ast::{BinaryOp, Expr, Literal, Property};
use arazzo_parser::{ComparisonOperator, Condition, ConditionKind, ConditionLiteral, LogicalOp, Operand};
use arazzo_runtime_expr::{resolve, AccessDescriptor, MessageSource};
use serde_json::Value;
use tracing::warn;

/// What the step being emitted has in scope, plus what lowering observed
#[derive(Debug, Clone, Default)]
pub struct StepScope {
    pub step_id: String,
    pub has_payload: bool,
    /// Context keys read while lowering, in order
    pub context_reads: Vec<String>,
    /// Expressions that fell back to `undefined`, with the reason
    pub unresolved: Vec<(String, String)>,
}

impl StepScope {
    pub fn new(step_id: impl Into<String>, has_payload: bool) -> Self {
        Self {
            step_id: step_id.into(),
            has_payload,
            ..Default::default()
        }
    }

    /// A scope not tied to any step: no payload is bound
    pub fn detached() -> Self {
        Self::default()
    }
}

/// Resolve a runtime expression and lower the result
pub fn lower_runtime(expression: &str, scope: &mut StepScope) -> Expr {
    let descriptor = resolve(expression);
    lower_descriptor(expression, &descriptor, scope)
}

pub fn lower_descriptor(expression: &str, descriptor: &AccessDescriptor, scope: &mut StepScope) -> Expr {
    match descriptor {
        AccessDescriptor::StatusCode => Expr::ident("response").property("status"),
        AccessDescriptor::Url => Expr::ident("response").property("url"),
        AccessDescriptor::Data {
            source: MessageSource::Response,
            path,
        } => member_path(Expr::ident("data"), path),
        AccessDescriptor::Data {
            source: MessageSource::Request,
            path,
        } => {
            if scope.has_payload {
                member_path(Expr::ident("payload"), path)
            } else {
                let reason = "the step sends no request body".to_string();
                warn!(step = %scope.step_id, expression, "request body referenced without a payload");
                scope.unresolved.push((expression.to_string(), reason));
                Expr::undefined()
            }
        }
        AccessDescriptor::ResponseHeader { name } => Expr::call(
            Expr::ident("response").property("headers").property("get"),
            vec![Expr::string(name.as_str())],
        ),
        AccessDescriptor::ContextLookup { .. } => {
            let key = descriptor.context_key().unwrap_or_default();
            scope.context_reads.push(key.clone());
            Expr::ident("context").element(Expr::string(key))
        }
        AccessDescriptor::Unresolved { reason, .. } => {
            scope.unresolved.push((expression.to_string(), reason.clone()));
            Expr::undefined()
        }
    }
}

fn member_path(base: Expr, path: &[String]) -> Expr {
    path.iter().fold(base, |expr, segment| expr.member(segment))
}

pub fn lower_literal(literal: &ConditionLiteral) -> Expr {
    match literal {
        ConditionLiteral::Int(n) => Expr::int(*n),
        ConditionLiteral::Float(f) => Expr::Literal(Literal::Float(*f)),
        ConditionLiteral::String(s) => Expr::string(s.as_str()),
        ConditionLiteral::Bool(b) => Expr::bool(*b),
        ConditionLiteral::Null => Expr::null(),
    }
}

pub fn lower_operand(operand: &Operand, scope: &mut StepScope) -> Expr {
    match operand {
        Operand::Literal(literal) => lower_literal(literal),
        Operand::Runtime(expression) => lower_runtime(expression, scope),
    }
}

pub fn comparison_op(operator: ComparisonOperator) -> BinaryOp {
    match operator {
        ComparisonOperator::Eq => BinaryOp::StrictEq,
        ComparisonOperator::Ne => BinaryOp::StrictNe,
        ComparisonOperator::Lt => BinaryOp::Lt,
        ComparisonOperator::Le => BinaryOp::Le,
        ComparisonOperator::Gt => BinaryOp::Gt,
        ComparisonOperator::Ge => BinaryOp::Ge,
    }
}

/// Lower a condition tree as a plain value; comparisons become `===`, `<`, ...
pub fn lower_condition(condition: &Condition, scope: &mut StepScope) -> Expr {
    match &condition.kind {
        ConditionKind::Literal(literal) => lower_literal(literal),
        ConditionKind::Runtime(expression) => lower_runtime(expression, scope),
        ConditionKind::Index { object, index } => {
            let object = lower_condition(object, scope);
            object.element(lower_condition(index, scope))
        }
        ConditionKind::Property { object, property } => lower_condition(object, scope).member(property),
        ConditionKind::Not(operand) => Expr::not(lower_condition(operand, scope)),
        ConditionKind::Logical { op, left, right } => {
            let op = match op {
                LogicalOp::And => BinaryOp::And,
                LogicalOp::Or => BinaryOp::Or,
            };
            let left = lower_condition(left, scope);
            Expr::binary(op, left, lower_condition(right, scope))
        }
        ConditionKind::Assertion {
            operator,
            left,
            right,
            ..
        } => {
            let left = lower_condition(left, scope);
            Expr::binary(comparison_op(*operator), left, lower_condition(right, scope))
        }
    }
}

/// JSON value as a literal expression
pub fn lower_json(value: &Value) -> Expr {
    match value {
        Value::Null => Expr::null(),
        Value::Bool(b) => Expr::bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Expr::int(i),
            None => Expr::Literal(Literal::Float(n.as_f64().unwrap_or(0.0))),
        },
        Value::String(s) => Expr::string(s.as_str()),
        Value::Array(items) => Expr::Array(items.iter().map(lower_json).collect()),
        Value::Object(map) => Expr::Object(
            map.iter()
                .map(|(key, value)| Property::new(key.as_str(), lower_json(value)))
                .collect(),
        ),
    }
}

/// A parameter or output value: runtime expression when it is a `$` string, else a literal
pub fn lower_value(value: &Value, scope: &mut StepScope) -> Expr {
    match value.as_str() {
        Some(text) if text.starts_with('$') => lower_runtime(text, scope),
        _ => lower_json(value),
    }
}
