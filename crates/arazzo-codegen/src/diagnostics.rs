//! Warnings and errors collected during generation

use arazzo_ast::Span;
use serde::Serialize;
use std::fmt;

use crate::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Something the generator skipped or degraded, tied to the step it happened in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<&'static str>,
    pub workflow_id: String,
    pub step_id: Option<String>,
    pub message: String,
    /// Text `span` points into (a condition or runtime expression)
    pub source: Option<String>,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn warning(workflow_id: &str, step_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            workflow_id: workflow_id.to_string(),
            step_id: step_id.map(str::to_string),
            message: message.into(),
            source: None,
            span: None,
        }
    }

    /// A criterion that could not be compiled
    pub fn compile_error(workflow_id: &str, step_id: &str, condition: &str, error: &CompileError) -> Self {
        Self {
            severity: Severity::Error,
            code: Some(error.code()),
            workflow_id: workflow_id.to_string(),
            step_id: Some(step_id.to_string()),
            message: error.to_string(),
            source: Some(condition.to_string()),
            span: error.span(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.workflow_id)?;
        if let Some(step_id) = &self.step_id {
            write!(f, "/{}", step_id)?;
        }
        write!(f, ": {}", self.message)
    }
}
