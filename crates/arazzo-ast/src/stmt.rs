//! Statement nodes

use serde::{Deserialize, Serialize};
use crate::Expr;

/// A statement in the generated program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Constant binding: `const x = 5;` or `const ctx: Record<string, unknown> = {};`
    Const {
        name: String,
        /// Type annotation, written verbatim
        ty: Option<String>,
        init: Expr,
    },

    /// Assignment: `context["a.outputs.b"] = data.b;`
    Assign { target: Expr, value: Expr },

    /// Expression statement: `assertEquals(a, b, "msg");`
    Expr(Expr),

    /// Blank line between groups of statements
    Empty,
}

impl Stmt {
    pub fn constant(name: impl Into<String>, init: Expr) -> Self {
        Stmt::Const {
            name: name.into(),
            ty: None,
            init,
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign { target, value }
    }
}

/// A module import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Named imports; empty means a side-effect import (`import "mod";`)
    pub names: Vec<String>,
    pub module: String,
}

impl Import {
    pub fn side_effect(module: impl Into<String>) -> Self {
        Self {
            names: Vec::new(),
            module: module.into(),
        }
    }

    pub fn named(names: Vec<String>, module: impl Into<String>) -> Self {
        Self {
            names,
            module: module.into(),
        }
    }
}
