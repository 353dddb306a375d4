//! Condition parser - precedence climbing over the condition token stream
//!
//! Operator table, loosest first:
//! - `||` (1)
//! - `&&` (2)
//! - `==`, `!=` (3)
//! - `<`, `<=`, `>`, `>=` (4)
//!
//! All binary operators are left-associative. `!` is a prefix operator,
//! `(...)` groups, and `x[i]` / `x.p` are postfix accessors. Comparisons
//! become assertion nodes; `&&` and `||` become logical nodes.

mod comparison;
mod condition;
mod error;
mod parser;

pub use comparison::*;
pub use condition::*;
pub use error::*;
pub use parser::*;

use arazzo_lexer::tokenize;
use tracing::debug;

/// Parse condition text into a condition tree
pub fn parse_condition(source: &str) -> Result<Condition, ConditionError> {
    let tokens = tokenize(source);
    debug!(condition = source, tokens = tokens.len(), "parsing condition");
    let mut parser = Parser::new(source, tokens);
    parser.parse_condition()
}
