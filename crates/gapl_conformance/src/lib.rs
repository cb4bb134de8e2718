//! Conformance test helpers for the GAPL compiler.
//!
//! Provides shared pipeline functions that run CST programs through the full
//! pipeline (resolve → build → retime) and return structured results for
//! assertion in integration tests.

#![warn(missing_docs)]

use gapl_ast::Program;
use gapl_build::BuildError;
use gapl_common::Interner;
use gapl_config::DelayModel;
use gapl_cst::{CstFunctionDefinition, CstInterfaceDefinition, CstProgram};
use gapl_ir::{Design, Module, ModuleId, NodeId};
use gapl_resolve::ResolveError;
use gapl_retime::{RetimeError, RetimeReport, RetimeTarget};

/// Any failure along the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The CST document is not valid JSON for a program.
    #[error("invalid CST document: {0}")]
    Json(#[from] serde_json::Error),
    /// Name resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Module building failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Retiming failed.
    #[error(transparent)]
    Retime(#[from] RetimeError),
}

/// Result of running the resolve → build pipeline.
pub struct Compiled {
    /// Identifier table for the program and design.
    pub interner: Interner,
    /// The resolved program.
    pub program: Program,
    /// The built design.
    pub design: Design,
}

impl Compiled {
    /// Returns every module built for `function`, in build order.
    pub fn modules_of(&self, function: &str) -> Vec<(ModuleId, &Module)> {
        self.design
            .modules()
            .filter(|(_, m)| self.interner.resolve(m.invocation.function) == function)
            .collect()
    }

    /// Returns the single module built for `function`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one module was built for `function`.
    pub fn module(&self, function: &str) -> (ModuleId, &Module) {
        let modules = self.modules_of(function);
        assert_eq!(
            modules.len(),
            1,
            "expected one module for `{function}`, found {}",
            modules.len()
        );
        modules[0]
    }

    /// Finds a node of `module` by name.
    pub fn node(&self, module: &Module, name: &str) -> Option<NodeId> {
        module
            .nodes()
            .iter()
            .find(|(_, n)| self.interner.resolve(n.name) == name)
            .map(|(id, _)| id)
    }

    /// Names of a module's input ports, in order.
    pub fn input_names(&self, module: &Module) -> Vec<String> {
        module
            .inputs
            .iter()
            .map(|p| self.interner.resolve(p.name).to_string())
            .collect()
    }

    /// Names of a module's output ports, in order.
    pub fn output_names(&self, module: &Module) -> Vec<String> {
        module
            .outputs
            .iter()
            .map(|p| self.interner.resolve(p.name).to_string())
            .collect()
    }
}

/// Assembles a program from definitions.
pub fn program(
    interfaces: Vec<CstInterfaceDefinition>,
    functions: Vec<CstFunctionDefinition>,
) -> CstProgram {
    CstProgram {
        interface_definitions: interfaces,
        function_definitions: functions,
    }
}

/// Resolves a program.
pub fn resolve(cst: &CstProgram) -> Result<(Program, Interner), ResolveError> {
    let interner = Interner::new();
    let program = gapl_resolve::resolve_program(cst, &interner)?;
    Ok((program, interner))
}

/// Resolves and builds a program.
pub fn compile(cst: &CstProgram) -> Result<Compiled, PipelineError> {
    let (program, interner) = resolve(cst)?;
    let design = gapl_build::build_all_modules(&program, &interner)?;
    Ok(Compiled {
        interner,
        program,
        design,
    })
}

/// Parses a CST JSON document, then resolves and builds it.
pub fn compile_json(json: &str) -> Result<Compiled, PipelineError> {
    let cst: CstProgram = serde_json::from_str(json)?;
    compile(&cst)
}

/// Compiles a program and retimes the design.
pub fn compile_and_retime(
    cst: &CstProgram,
    delay: &DelayModel,
    target: RetimeTarget,
) -> Result<(Compiled, Vec<RetimeReport>), PipelineError> {
    let mut compiled = compile(cst)?;
    let retimed =
        gapl_retime::retime_design(&compiled.design, delay, target, &compiled.interner)?;
    compiled.design = retimed.design;
    Ok((compiled, retimed.reports))
}

/// Clock period of a module under `delay`, or `None` if it cannot be
/// converted to a circuit graph.
pub fn clock_period(
    module: &Module,
    delay: &DelayModel,
    interner: &Interner,
) -> Result<Option<i64>, RetimeError> {
    let name = gapl_ir::module_name(&module.invocation, interner);
    match gapl_retime::module_to_circuit(module, delay, &name)? {
        Some(circuit) => Ok(Some(
            circuit.clock_period().map_err(|source| RetimeError::Graph {
                module: name,
                source,
            })?,
        )),
        None => Ok(None),
    }
}

/// Number of register nodes in a module.
pub fn register_count(module: &Module) -> usize {
    module.nodes().values().filter(|n| n.is_register()).count()
}
