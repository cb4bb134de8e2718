//! Retiming of built GAPL designs.
//!
//! Every module that contains registers is converted into a
//! [`CircuitGraph`](gapl_graph::CircuitGraph) whose nodes are the module's
//! combinational nodes and whose edge weights count the registers between
//! them. The graph is retimed and converted back into a module with fresh
//! register chains.

#![warn(missing_docs)]

pub mod convert;
pub mod delay;
pub mod error;
pub mod pass;
#[cfg(test)]
mod testing;

pub use convert::{circuit_dot, circuit_to_module, module_to_circuit, ModuleCircuit};
pub use delay::{validate_delay_model, PropagationDelay};
pub use error::RetimeError;
pub use pass::{retime_design, retime_module, RetimeReport, RetimeTarget, RetimedDesign};
