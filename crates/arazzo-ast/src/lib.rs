//! Arazzo AST - Nodes of the generated test program
//!
//! The code generator lowers workflows into these nodes. They model the
//! small slice of TypeScript the generated Deno tests need: constants,
//! assignments, calls, property/element access, templates, object literals
//! and async arrow functions. The `printer` module turns them into text.

mod span;
mod assertion;
mod expr;
mod stmt;
mod printer;

pub use span::*;
pub use assertion::*;
pub use expr::*;
pub use stmt::*;
pub use printer::*;

use serde::{Deserialize, Serialize};

/// A complete generated test module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Leading doc comment, printed as a `/** ... */` block
    pub header: Option<String>,
    pub imports: Vec<Import>,
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(imports: Vec<Import>, body: Vec<Stmt>) -> Self {
        Self {
            header: None,
            imports,
            body,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}
