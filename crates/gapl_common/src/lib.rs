//! Shared foundational types used across the GAPL compiler.
//!
//! This crate provides interned identifiers and the internal error type that every
//! other stage reports invariant violations with.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{GaplResult, InternalError};
