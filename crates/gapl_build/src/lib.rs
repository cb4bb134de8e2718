//! Netlist construction for resolved GAPL programs.
//!
//! The builder monomorphizes generic function and interface definitions:
//! every distinct [`ModuleInvocation`](gapl_ir::ModuleInvocation) reachable
//! from the non-generic functions is built exactly once and stored in a
//! [`Design`](gapl_ir::Design).
//!
//! # Usage
//!
//! ```ignore
//! let program = gapl_resolve::resolve_program(&cst, &interner)?;
//! let design = gapl_build::build_all_modules(&program, &interner)?;
//! ```

#![warn(missing_docs)]

pub mod bindings;
mod body;
pub mod context;
pub mod error;
pub mod eval;
pub mod expand;

#[cfg(test)]
mod testing;

pub use bindings::Bindings;
pub use context::{build_all_modules, BuildContext};
pub use error::BuildError;
pub use eval::eval_static;
pub use expand::{Callee, Expander};
