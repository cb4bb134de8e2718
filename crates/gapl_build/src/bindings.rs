//! Generic parameter bindings of one instantiation.

use gapl_common::Ident;
use gapl_ir::{InterfaceStructure, ModuleInvocation};
use std::collections::HashMap;

/// Concrete values bound to the generic parameters of a definition.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    interfaces: HashMap<Ident, InterfaceStructure>,
    integers: HashMap<Ident, i64>,
    functions: HashMap<Ident, ModuleInvocation>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a generic interface.
    pub fn bind_interface(&mut self, name: Ident, structure: InterfaceStructure) {
        self.interfaces.insert(name, structure);
    }

    /// Binds an integer parameter.
    pub fn bind_integer(&mut self, name: Ident, value: i64) {
        self.integers.insert(name, value);
    }

    /// Binds a function parameter.
    pub fn bind_function(&mut self, name: Ident, invocation: ModuleInvocation) {
        self.functions.insert(name, invocation);
    }

    /// Looks up a generic interface.
    pub fn interface(&self, name: Ident) -> Option<&InterfaceStructure> {
        self.interfaces.get(&name)
    }

    /// Looks up an integer parameter.
    pub fn integer(&self, name: Ident) -> Option<i64> {
        self.integers.get(&name).copied()
    }

    /// Looks up a function parameter.
    pub fn function(&self, name: Ident) -> Option<&ModuleInvocation> {
        self.functions.get(&name)
    }
}
