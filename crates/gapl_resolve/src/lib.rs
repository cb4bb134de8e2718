//! Name resolution: concrete syntax tree to abstract syntax tree.
//!
//! Resolution builds a chain of [`Scope`]s (program, function or interface,
//! then one per conditional branch), checks that no scope declares a name
//! twice, and classifies every expression by what its names resolve to.
//! Predefined functions are found through an intrinsic table consulted after
//! the scope chain.

#![warn(missing_docs)]

pub mod error;
mod resolver;
pub mod scope;

pub use error::ResolveError;
pub use resolver::resolve_program;
pub use scope::{Declaration, Scope, ScopeKind};
