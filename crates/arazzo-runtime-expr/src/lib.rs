//! Arazzo runtime expressions
//!
//! Parses the `$`-prefixed runtime expression syntax (`$statusCode`,
//! `$response.body#/robotId`, `$steps.createRobot.outputs.robotId`, ...)
//! and resolves parsed expressions into access descriptors the code
//! generator can lower.
//!
//! Root keywords match case-insensitively; names, tokens and pointer
//! segments are case-sensitive. A parse either consumes the whole input or
//! fails with a [`SyntaxError`].

mod error;
mod grammar;
mod pointer;
mod resolver;

pub use error::*;
pub use grammar::*;
pub use pointer::*;
pub use resolver::*;
