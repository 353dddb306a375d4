//! Expression nodes

use serde::{Deserialize, Serialize};
use crate::Stmt;

/// An expression in the generated program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Identifier: `data`, `context`
    Ident(String),

    /// Literal value: `42`, `"robot"`, `true`, `null`
    Literal(Literal),

    /// Property access: `response.status`
    Property {
        object: Box<Expr>,
        property: String,
    },

    /// Element access: `context["createRobot.outputs.robotId"]`
    Element {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// Function call: `assertEquals(a, b, "msg")`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Constructor call: `new RegExp(/x/)`
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `await expr`
    Await(Box<Expr>),

    /// Template literal: `` `${serverUrl}/v1/robots` ``
    Template(Template),

    /// Object literal: `{ method: "GET" }`
    Object(Vec<Property>),

    /// Array literal: `[1, 2]`
    Array(Vec<Expr>),

    /// Regular expression literal: `/^a+$/i`
    Regex {
        pattern: String,
        flags: String,
    },

    /// Binary operation: `a === b`, `a && b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: `!x`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Arrow function with a block body: `async (test) => { ... }`
    Arrow {
        is_async: bool,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    /// `undefined`, also the placeholder for expressions that could not be resolved
    Undefined,
}

/// Template literal pieces: `head${spans[0].expr}spans[0].tail...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub head: String,
    pub spans: Vec<TemplateSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpan {
    pub expr: Expr,
    pub tail: String,
}

impl Template {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            spans: Vec::new(),
        }
    }

    /// Append a `${expr}` slot followed by literal text
    pub fn push(&mut self, expr: Expr, tail: impl Into<String>) {
        self.spans.push(TemplateSpan {
            expr,
            tail: tail.into(),
        });
    }

    /// Append literal text after the last slot (or to the head)
    pub fn push_text(&mut self, text: &str) {
        match self.spans.last_mut() {
            Some(span) => span.tail.push_str(text),
            None => self.head.push_str(text),
        }
    }
}

/// Object literal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    /// Bare key: `method`
    Ident(String),
    /// Quoted key: `"Content-Type"`
    String(String),
}

impl Property {
    /// Builds a property, quoting the key only when it is not a valid identifier
    pub fn new(key: impl Into<String>, value: Expr) -> Self {
        let key = key.into();
        let key = if is_valid_identifier(&key) {
            PropertyKey::Ident(key)
        } else {
            PropertyKey::String(key)
        };
        Self { key, value }
    }

    /// Builds a property with an explicitly quoted key
    pub fn quoted(key: impl Into<String>, value: Expr) -> Self {
        Self {
            key: PropertyKey::String(key.into()),
            value,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn undefined() -> Self {
        Expr::Literal(Literal::Undefined)
    }

    /// `self.name`
    pub fn property(self, name: impl Into<String>) -> Self {
        Expr::Property {
            object: Box::new(self),
            property: name.into(),
        }
    }

    /// `self[index]`
    pub fn element(self, index: Expr) -> Self {
        Expr::Element {
            object: Box::new(self),
            index: Box::new(index),
        }
    }

    /// `self.name` when `name` is an identifier, `self["name"]` otherwise
    pub fn member(self, name: &str) -> Self {
        if is_valid_identifier(name) {
            self.property(name)
        } else {
            self.element(Expr::string(name))
        }
    }

    /// `callee(args...)`
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// `new callee(args...)`
    pub fn new_instance(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            callee: Box::new(callee),
            args,
        }
    }

    /// `await self`
    pub fn awaited(self) -> Self {
        Expr::Await(Box::new(self))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn async_arrow(params: Vec<String>, body: Vec<Stmt>) -> Self {
        Expr::Arrow {
            is_async: true,
            params,
            body,
        }
    }
}

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch",
    "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be written as a bare identifier or property name
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Turn an arbitrary parameter name into a binding name usable with `const`
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&out.as_str()) {
        out.insert(0, '_');
    }
    out
}
