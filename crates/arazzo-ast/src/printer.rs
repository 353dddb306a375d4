//! TypeScript text printer for the generated program
//!
//! Serializes the AST into Deno-flavoured TypeScript with two-space
//! indentation. Output is deliberately plain; layout beyond indentation
//! and line breaks is left to an external formatter.

use crate::{
    BinaryOp, Expr, Import, Literal, Program, Property, PropertyKey, Stmt, Template, UnaryOp,
};

/// Trait for converting AST nodes to TypeScript source text.
pub trait ToTs {
    /// Convert to TypeScript with the given indentation level.
    fn to_ts(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (two spaces per level).
fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Escape a string for a double-quoted literal
fn escape_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            _ => result.push(c),
        }
    }
    result
}

/// Escape literal text inside a template literal
fn escape_template(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Escape spelling of a JS line terminator, which may not appear raw in a regex literal
fn line_terminator(c: char) -> Option<&'static str> {
    match c {
        '\n' => Some("n"),
        '\r' => Some("r"),
        '\u{2028}' => Some("u2028"),
        '\u{2029}' => Some("u2029"),
        _ => None,
    }
}

/// Escape unescaped forward slashes and line terminators so the pattern
/// survives inside `/.../`
fn escape_regex(pattern: &str) -> String {
    let mut result = String::new();
    let mut escaped = false;
    let mut in_class = false;
    for c in pattern.chars() {
        if let Some(spelling) = line_terminator(c) {
            if !escaped {
                result.push('\\');
            }
            result.push_str(spelling);
            escaped = false;
            continue;
        }
        if escaped {
            result.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                result.push_str("\\/");
                continue;
            }
            _ => {}
        }
        result.push(c);
    }
    result
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

// ===== Program =====

impl ToTs for Program {
    fn to_ts(&self, indent: usize) -> String {
        let mut out = String::new();

        if let Some(header) = &self.header {
            out.push_str(&indent_str(indent));
            out.push_str("/**\n");
            for line in header.lines() {
                out.push_str(&indent_str(indent));
                if line.is_empty() {
                    out.push_str(" *\n");
                } else {
                    out.push_str(&format!(" * {}\n", line));
                }
            }
            out.push_str(&indent_str(indent));
            out.push_str(" */\n");
        }

        for import in &self.imports {
            out.push_str(&import.to_ts(indent));
            out.push('\n');
        }

        if !self.imports.is_empty() && !self.body.is_empty() {
            out.push('\n');
        }

        let body = self
            .body
            .iter()
            .map(|stmt| stmt.to_ts(indent))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push_str(&body);
        if !body.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl ToTs for Import {
    fn to_ts(&self, indent: usize) -> String {
        if self.names.is_empty() {
            format!("{}import {};", indent_str(indent), quote(&self.module))
        } else {
            format!(
                "{}import {{ {} }} from {};",
                indent_str(indent),
                self.names.join(", "),
                quote(&self.module)
            )
        }
    }
}

// ===== Statements =====

impl ToTs for Stmt {
    fn to_ts(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        match self {
            Stmt::Const { name, ty, init } => match ty {
                Some(ty) => format!("{}const {}: {} = {};", ind, name, ty, init.to_ts(indent)),
                None => format!("{}const {} = {};", ind, name, init.to_ts(indent)),
            },
            Stmt::Assign { target, value } => format!(
                "{}{} = {};",
                ind,
                target.to_ts(indent),
                value.to_ts(indent)
            ),
            Stmt::Expr(expr) => format!("{}{};", ind, expr.to_ts(indent)),
            Stmt::Empty => String::new(),
        }
    }
}

fn block_to_ts(body: &[Stmt], indent: usize) -> String {
    if body.is_empty() {
        return "{}".to_string();
    }
    let mut lines = vec!["{".to_string()];
    for stmt in body {
        lines.push(stmt.to_ts(indent + 1));
    }
    lines.push(format!("{}}}", indent_str(indent)));
    lines.join("\n")
}

// ===== Expressions =====

impl Expr {
    /// Whether this expression must be parenthesized when used as the
    /// object of a member access or the operand of an operator
    fn needs_parens(&self) -> bool {
        matches!(
            self,
            Expr::Binary { .. } | Expr::Unary { .. } | Expr::Await(_) | Expr::Arrow { .. } | Expr::New { .. }
        )
    }

    fn to_ts_operand(&self, indent: usize) -> String {
        if self.needs_parens() {
            format!("({})", self.to_ts(indent))
        } else {
            self.to_ts(indent)
        }
    }
}

fn args_to_ts(args: &[Expr], indent: usize) -> String {
    args.iter()
        .map(|arg| arg.to_ts(indent))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ToTs for Expr {
    fn to_ts(&self, indent: usize) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Literal(lit) => lit.to_ts(indent),
            Expr::Property { object, property } => {
                format!("{}.{}", object.to_ts_operand(indent), property)
            }
            Expr::Element { object, index } => {
                format!("{}[{}]", object.to_ts_operand(indent), index.to_ts(indent))
            }
            Expr::Call { callee, args } => {
                format!("{}({})", callee.to_ts_operand(indent), args_to_ts(args, indent))
            }
            Expr::New { callee, args } => {
                format!("new {}({})", callee.to_ts_operand(indent), args_to_ts(args, indent))
            }
            Expr::Await(inner) => format!("await {}", inner.to_ts_operand(indent)),
            Expr::Template(template) => template.to_ts(indent),
            Expr::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let mut lines = vec!["{".to_string()];
                for prop in props {
                    lines.push(format!("{},", prop.to_ts(indent + 1)));
                }
                lines.push(format!("{}}}", indent_str(indent)));
                lines.join("\n")
            }
            Expr::Array(items) => format!("[{}]", args_to_ts(items, indent)),
            Expr::Regex { pattern, flags } => format!("/{}/{}", escape_regex(pattern), flags),
            Expr::Binary { op, left, right } => format!(
                "{} {} {}",
                left.to_ts_operand(indent),
                op.symbol(),
                right.to_ts_operand(indent)
            ),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => format!("!{}", operand.to_ts_operand(indent)),
            },
            Expr::Arrow {
                is_async,
                params,
                body,
            } => format!(
                "{}({}) => {}",
                if *is_async { "async " } else { "" },
                params.join(", "),
                block_to_ts(body, indent)
            ),
        }
    }
}

impl ToTs for Literal {
    fn to_ts(&self, _indent: usize) -> String {
        match self {
            Literal::Int(n) => n.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::String(s) => quote(s),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
            Literal::Undefined => "undefined".to_string(),
        }
    }
}

impl ToTs for Template {
    fn to_ts(&self, indent: usize) -> String {
        let mut out = String::from("`");
        out.push_str(&escape_template(&self.head));
        for span in &self.spans {
            out.push_str("${");
            out.push_str(&span.expr.to_ts(indent));
            out.push('}');
            out.push_str(&escape_template(&span.tail));
        }
        out.push('`');
        out
    }
}

impl ToTs for Property {
    fn to_ts(&self, indent: usize) -> String {
        let key = match &self.key {
            PropertyKey::Ident(name) => name.clone(),
            PropertyKey::String(name) => quote(name),
        };
        format!("{}{}: {}", indent_str(indent), key, self.value.to_ts(indent))
    }
}

impl ToTs for BinaryOp {
    fn to_ts(&self, _indent: usize) -> String {
        self.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_to_ts() {
        assert_eq!(Literal::Int(42).to_ts(0), "42");
        assert_eq!(Literal::Float(2.5).to_ts(0), "2.5");
        assert_eq!(Literal::String("hello".to_string()).to_ts(0), "\"hello\"");
        assert_eq!(Literal::Bool(true).to_ts(0), "true");
        assert_eq!(Literal::Null.to_ts(0), "null");
        assert_eq!(Literal::Undefined.to_ts(0), "undefined");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("hello \"world\""), "hello \\\"world\\\"");
        assert_eq!(escape_string("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_escape_regex_slashes() {
        assert_eq!(escape_regex("a/b"), "a\\/b");
        assert_eq!(escape_regex("a\\/b"), "a\\/b");
        assert_eq!(escape_regex("[/]"), "[/]");
    }

    #[test]
    fn test_escape_regex_line_terminators() {
        assert_eq!(escape_regex("a\u{2028}b"), "a\\u2028b");
        assert_eq!(escape_regex("a\u{2029}b"), "a\\u2029b");
        assert_eq!(escape_regex("a\nb\r"), "a\\nb\\r");
        assert_eq!(escape_regex("a\\\u{2028}"), "a\\u2028");
        assert!(!escape_regex("[\u{2028}]").contains('\u{2028}'));
    }

    #[test]
    fn test_context_write_statement() {
        let stmt = Stmt::assign(
            Expr::ident("context").element(Expr::string("createRobot.outputs.robotId")),
            Expr::ident("data").property("robotId"),
        );
        assert_eq!(
            stmt.to_ts(1),
            "  context[\"createRobot.outputs.robotId\"] = data.robotId;"
        );
    }

    #[test]
    fn test_template_literal() {
        let mut template = Template::new("");
        template.push(Expr::ident("serverUrl"), "/v1/robots/");
        template.push(Expr::ident("robotId"), "/parts");
        assert_eq!(
            Expr::Template(template).to_ts(0),
            "`${serverUrl}/v1/robots/${robotId}/parts`"
        );
    }

    #[test]
    fn test_object_literal_indentation() {
        let object = Expr::Object(vec![
            Property::new("method", Expr::string("GET")),
            Property::new("Content-Type", Expr::string("application/json")),
        ]);
        assert_eq!(
            object.to_ts(1),
            "{\n    method: \"GET\",\n    \"Content-Type\": \"application/json\",\n  }"
        );
    }

    #[test]
    fn test_nested_binary_is_parenthesized() {
        let expr = Expr::not(Expr::binary(
            BinaryOp::StrictEq,
            Expr::ident("a").property("b"),
            Expr::int(1),
        ));
        assert_eq!(expr.to_ts(0), "!(a.b === 1)");
    }

    #[test]
    fn test_async_arrow_block() {
        let arrow = Expr::async_arrow(
            vec!["test".to_string()],
            vec![Stmt::constant("x", Expr::int(1))],
        );
        assert_eq!(arrow.to_ts(0), "async (test) => {\n  const x = 1;\n}");
    }

    #[test]
    fn test_program_with_header_and_imports() {
        let program = Program::new(
            vec![
                Import::side_effect("jsr:@std/dotenv/load"),
                Import::named(vec!["assertEquals".to_string()], "jsr:@std/assert"),
            ],
            vec![Stmt::expr(Expr::call(Expr::ident("run"), vec![]))],
        )
        .with_header("Generated.\nDo not edit.");

        let text = program.to_ts(0);
        assert!(text.starts_with("/**\n * Generated.\n * Do not edit.\n */\n"));
        assert!(text.contains("import \"jsr:@std/dotenv/load\";\n"));
        assert!(text.contains("import { assertEquals } from \"jsr:@std/assert\";\n\nrun();\n"));
    }
}
