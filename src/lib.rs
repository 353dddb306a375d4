//! Arazzo test generator
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use arazzo_ast as ast;
pub use arazzo_codegen as codegen;
pub use arazzo_document as document;
pub use arazzo_parser as parser;
pub use arazzo_runtime_expr as runtime_expr;
