//! Injective module naming.
//!
//! Every distinct [`ModuleInvocation`] maps to a distinct Verilog-safe
//! identifier and equal invocations map to the same identifier. Names are
//! escaped so a literal `_` can never be confused with a section marker:
//!
//! - `_u` is an underscore from the source name
//! - `_xHH_` is any other non-alphanumeric byte
//! - `_I` starts the interface arguments, `_P` the parameter arguments
//! - `_E` closes a nested function parameter
//!
//! Interface tokens are `w` (wire), `v<size>e<element>` (vector) and
//! `r<count>e` followed by `<escaped name>_c<structure>` per member, with
//! members sorted by name so record order does not matter. Parameter tokens
//! are `i<n>e`, `n<|n|>e` for negatives, and `f<name>_E` for functions.

use crate::interface::InterfaceStructure;
use crate::invocation::{ModuleInvocation, ParameterValue};
use gapl_common::Interner;
use std::fmt::Write;

/// Returns the module name for an invocation.
pub fn module_name(invocation: &ModuleInvocation, interner: &Interner) -> String {
    let mut out = String::new();
    write_invocation(&mut out, invocation, interner);
    out
}

fn write_invocation(out: &mut String, invocation: &ModuleInvocation, interner: &Interner) {
    escape(out, interner.resolve(invocation.function));
    if !invocation.interfaces.is_empty() {
        out.push_str("_I");
        for structure in &invocation.interfaces {
            write_structure(out, structure, interner);
        }
    }
    if !invocation.parameters.is_empty() {
        out.push_str("_P");
        for parameter in &invocation.parameters {
            match parameter {
                ParameterValue::Integer(v) if *v < 0 => {
                    let _ = write!(out, "n{}e", v.unsigned_abs());
                }
                ParameterValue::Integer(v) => {
                    let _ = write!(out, "i{v}e");
                }
                ParameterValue::Function(f) => {
                    out.push('f');
                    write_invocation(out, f, interner);
                    out.push_str("_E");
                }
            }
        }
    }
}

fn write_structure(out: &mut String, structure: &InterfaceStructure, interner: &Interner) {
    match structure {
        InterfaceStructure::Wire => out.push('w'),
        InterfaceStructure::Vector { element, size } => {
            let _ = write!(out, "v{size}e");
            write_structure(out, element, interner);
        }
        InterfaceStructure::Record(fields) => {
            let _ = write!(out, "r{}e", fields.len());
            let mut sorted: Vec<_> = fields
                .iter()
                .map(|(name, s)| (interner.resolve(*name), s))
                .collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            for (name, s) in sorted {
                escape(out, name);
                out.push_str("_c");
                write_structure(out, s, interner);
            }
        }
    }
}

fn escape(out: &mut String, name: &str) {
    for byte in name.bytes() {
        match byte {
            b'_' => out.push_str("_u"),
            b if b.is_ascii_alphanumeric() => out.push(b as char),
            b => {
                let _ = write!(out, "_x{b:02x}_");
            }
        }
    }
}
