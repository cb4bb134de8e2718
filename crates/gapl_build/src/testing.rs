//! Helpers shared by the unit tests of this crate.

use gapl_ast::Program;
use gapl_common::Interner;
use gapl_cst::{CstFunctionDefinition, CstInterfaceDefinition, CstProgram};
use gapl_ir::{Design, Module, NodeId, Side, WireRef, WireSlot};

use crate::context::build_all_modules;
use crate::error::BuildError;

pub(crate) fn function(name: &str) -> CstFunctionDefinition {
    CstFunctionDefinition::new(name)
}

pub(crate) fn resolve(
    interfaces: Vec<CstInterfaceDefinition>,
    functions: Vec<CstFunctionDefinition>,
) -> (Program, Interner) {
    let interner = Interner::new();
    let cst = CstProgram {
        interface_definitions: interfaces,
        function_definitions: functions,
    };
    let program = gapl_resolve::resolve_program(&cst, &interner).unwrap();
    (program, interner)
}

pub(crate) fn build(
    interfaces: Vec<CstInterfaceDefinition>,
    functions: Vec<CstFunctionDefinition>,
) -> (Result<Design, BuildError>, Interner) {
    let (program, interner) = resolve(interfaces, functions);
    (build_all_modules(&program, &interner), interner)
}

pub(crate) fn node_named(module: &Module, interner: &Interner, name: &str) -> NodeId {
    module
        .nodes()
        .iter()
        .find(|(_, n)| interner.resolve(n.name) == name)
        .map(|(id, _)| id)
        .unwrap()
}

pub(crate) fn data(node: NodeId, side: Side, leaf: u32) -> WireRef {
    WireRef {
        node,
        side,
        port: 0,
        slot: WireSlot::Data(leaf),
    }
}
