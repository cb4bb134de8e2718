//! Module invocations, the key under which built modules are memoized.

use crate::interface::InterfaceStructure;
use gapl_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// A concrete generic parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterValue {
    /// An evaluated static expression.
    Integer(i64),
    /// A function passed as a parameter, fully instantiated.
    Function(ModuleInvocation),
}

/// A function together with the concrete generic values it is instantiated with.
///
/// Two invocations with equal fields denote the same hardware, so the builder
/// hands out exactly one module per distinct invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleInvocation {
    /// Name of the invoked function.
    pub function: Ident,
    /// Interface arguments in declaration order.
    pub interfaces: Vec<InterfaceStructure>,
    /// Parameter arguments in declaration order.
    pub parameters: Vec<ParameterValue>,
}

impl ModuleInvocation {
    /// Creates an invocation with no generic arguments.
    pub fn plain(function: Ident) -> Self {
        Self {
            function,
            interfaces: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Returns `true` if the invocation carries any generic arguments.
    pub fn is_generic(&self) -> bool {
        !self.interfaces.is_empty() || !self.parameters.is_empty()
    }

    /// Renders the invocation as source-like text, for diagnostics.
    pub fn describe(&self, interner: &Interner) -> String {
        let mut args: Vec<String> = self
            .interfaces
            .iter()
            .map(|s| s.describe(interner))
            .collect();
        args.extend(self.parameters.iter().map(|p| match p {
            ParameterValue::Integer(v) => v.to_string(),
            ParameterValue::Function(f) => f.describe(interner),
        }));
        format!("{}({})", interner.resolve(self.function), args.join(", "))
    }
}
