//! Resolution of runtime expressions into access descriptors
//!
//! A descriptor says where a value lives at test run time (the response
//! status, a path inside a message body, a context-store key) without
//! committing to any particular target syntax.

use serde::Serialize;
use tracing::warn;

use crate::{parse, RuntimeExpression, Source, SyntaxError};

/// Which message a body path reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Request,
    Response,
}

/// Where a runtime expression's value is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AccessDescriptor {
    /// The numeric response status
    StatusCode,

    /// The final response URL
    Url,

    /// A value inside a message body; an empty path is the whole body
    Data {
        source: MessageSource,
        path: Vec<String>,
    },

    /// A response header value
    ResponseHeader { name: String },

    /// A value written by an earlier step, keyed `"<stepId>.<element>.<key>"`
    ContextLookup {
        step_id: String,
        element: String,
        key: String,
    },

    /// Placeholder for expressions the generator cannot read
    Unresolved { expression: String, reason: String },
}

impl AccessDescriptor {
    /// The context-store key for a [`AccessDescriptor::ContextLookup`]
    pub fn context_key(&self) -> Option<String> {
        match self {
            AccessDescriptor::ContextLookup {
                step_id,
                element,
                key,
            } => Some(format!("{}.{}.{}", step_id, element, key)),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, AccessDescriptor::Unresolved { .. })
    }

    fn unresolved(expression: &str, reason: impl Into<String>) -> Self {
        AccessDescriptor::Unresolved {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Resolve an expression, degrading to [`AccessDescriptor::Unresolved`] on any failure
pub fn resolve(expression: &str) -> AccessDescriptor {
    match try_resolve(expression) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            warn!(expression, error = %err, "invalid runtime expression");
            AccessDescriptor::unresolved(expression, err.to_string())
        }
    }
}

/// Resolve an expression, surfacing grammar failures to the caller
pub fn try_resolve(expression: &str) -> Result<AccessDescriptor, SyntaxError> {
    let parsed = parse(expression)?;
    Ok(resolve_parsed(expression, &parsed))
}

/// Map an already parsed expression to its descriptor
pub fn resolve_parsed(expression: &str, parsed: &RuntimeExpression) -> AccessDescriptor {
    let descriptor = match parsed {
        RuntimeExpression::StatusCode => AccessDescriptor::StatusCode,
        RuntimeExpression::Url => AccessDescriptor::Url,
        RuntimeExpression::Request(Source::Body(pointer)) => AccessDescriptor::Data {
            source: MessageSource::Request,
            path: pointer.as_ref().map(|p| p.tokens.clone()).unwrap_or_default(),
        },
        RuntimeExpression::Response(Source::Body(pointer)) => AccessDescriptor::Data {
            source: MessageSource::Response,
            path: pointer.as_ref().map(|p| p.tokens.clone()).unwrap_or_default(),
        },
        RuntimeExpression::Response(Source::Header(name)) => {
            AccessDescriptor::ResponseHeader { name: name.clone() }
        }
        RuntimeExpression::Steps(name) => resolve_step_reference(expression, name),
        other => AccessDescriptor::unresolved(
            expression,
            format!("`{}` expressions are not supported", source_label(other)),
        ),
    };

    if let AccessDescriptor::Unresolved { reason, .. } = &descriptor {
        warn!(expression, reason = %reason, "unresolved runtime expression");
    }
    descriptor
}

fn resolve_step_reference(expression: &str, name: &str) -> AccessDescriptor {
    let mut parts = name.split('.');
    let (Some(step_id), Some(element)) = (parts.next(), parts.next()) else {
        return AccessDescriptor::unresolved(expression, "step reference needs a step id");
    };
    let key = parts.collect::<Vec<_>>().join(".");

    if step_id.is_empty() || element.is_empty() || key.is_empty() {
        return AccessDescriptor::unresolved(
            expression,
            "step reference must have the form $steps.<stepId>.<element>.<key>",
        );
    }

    AccessDescriptor::ContextLookup {
        step_id: step_id.to_string(),
        element: element.to_string(),
        key,
    }
}

fn source_label(expression: &RuntimeExpression) -> String {
    let source = match expression {
        RuntimeExpression::Request(source)
        | RuntimeExpression::Response(source)
        | RuntimeExpression::Message(source) => source,
        other => return other.root().to_string(),
    };
    let part = match source {
        Source::Header(_) => "header",
        Source::Query(_) => "query",
        Source::Path(_) => "path",
        Source::Body(_) => "body",
    };
    format!("{}{}", expression.root(), part)
}
