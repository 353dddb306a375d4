//! Arazzo document inputs
//!
//! Serde models for the two documents the generator consumes: the Arazzo
//! workflow description and the OpenAPI description its steps call into.
//! Only the fields the generator reads are modelled; everything else in
//! the YAML is ignored.

mod arazzo;
mod error;
mod loader;
mod openapi;
mod security;

pub use arazzo::*;
pub use error::*;
pub use loader::*;
pub use openapi::*;
pub use security::*;
