//! Propagation delays of netlist nodes.

use crate::error::RetimeError;
use gapl_config::DelayModel;
use gapl_ir::{Node, NodeKind, PredefinedOp};

/// Assigns a propagation delay to every combinational node.
pub trait PropagationDelay {
    /// Returns the delay of `node`; never negative.
    fn delay(&self, node: &Node) -> i64;
}

impl PropagationDelay for DelayModel {
    /// Module IO and pass-through nodes are free. Nested module instances
    /// cost the model default; predefined functions are looked up by name
    /// and total output width.
    fn delay(&self, node: &Node) -> i64 {
        match &node.kind {
            NodeKind::ModuleInput | NodeKind::ModuleOutput | NodeKind::PassThrough => 0,
            NodeKind::Invocation { .. } => self.default,
            NodeKind::Predefined(function) => {
                let width = node.outputs.iter().map(|p| p.structure.width()).sum();
                self.delay_for(function.op().name(), width)
            }
        }
    }
}

/// Checks that every function named by the delay model is predefined.
pub fn validate_delay_model(model: &DelayModel) -> Result<(), RetimeError> {
    match model
        .functions
        .keys()
        .find(|name| PredefinedOp::from_name(name).is_none())
    {
        Some(name) => Err(RetimeError::UnknownDelayFunction { name: name.clone() }),
        None => Ok(()),
    }
}
