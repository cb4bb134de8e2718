//! The set of modules produced by one compilation.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::invocation::ModuleInvocation;
use crate::module::Module;
use serde::Serialize;

/// Every built module, plus the entry modules requested by the caller.
///
/// Modules are appended in post-order: a module is always allocated after
/// every module it instantiates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Design {
    modules: Arena<ModuleId, Module>,
    entries: Vec<ModuleId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finished module.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        self.modules.alloc(module)
    }

    /// Marks a module as an entry point.
    pub fn add_entry(&mut self, id: ModuleId) {
        if !self.entries.contains(&id) {
            self.entries.push(id);
        }
    }

    /// Returns a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Iterates over all modules in allocation order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter()
    }

    /// Returns the number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no module was built.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns the entry modules.
    pub fn entries(&self) -> &[ModuleId] {
        &self.entries
    }

    /// Finds the module built for an invocation.
    pub fn find(&self, invocation: &ModuleInvocation) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| &m.invocation == invocation)
            .map(|(id, _)| id)
    }

    /// Produces a new design with every module replaced by `f`'s result.
    ///
    /// Module IDs and entries are preserved, so invocation nodes stay valid as
    /// long as `f` keeps module interfaces unchanged.
    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(ModuleId, &Module) -> Result<Module, E>,
    ) -> Result<Design, E> {
        let mut modules = Arena::new();
        for (id, module) in self.modules.iter() {
            modules.alloc(f(id, module)?);
        }
        Ok(Design {
            modules,
            entries: self.entries.clone(),
        })
    }
}
