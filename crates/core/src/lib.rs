//! Domain types and pure logic for collaborative projects.
//!
//! Nothing in this crate performs I/O, so the store layer, the HTTP layer and
//! tests can all share the same project model, membership rule and compiler.

pub mod compile;
pub mod error;
pub mod file;
pub mod file_types;
pub mod membership;
pub mod project;
pub mod types;
