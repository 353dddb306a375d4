//! Arazzo Codegen - Deno test generation
//!
//! Compiles success criteria into `@std/assert` calls and lowers Arazzo
//! workflows, step by step, into a Deno test program.

mod context;
mod criteria;
mod diagnostics;
mod emitter;
mod error;
mod generator;
mod lower;
mod options;

pub use context::*;
pub use criteria::*;
pub use diagnostics::*;
pub use emitter::*;
pub use error::*;
pub use generator::*;
pub use lower::*;
pub use options::*;
