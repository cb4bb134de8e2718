//! Mutable build state for recursive module construction.
//!
//! [`BuildContext`] owns the [`Design`] under construction, a cache of already
//! built modules keyed by [`ModuleInvocation`], and the stack of invocations
//! currently being built, used to detect recursive instantiation.

use std::collections::HashMap;

use gapl_ast::Program;
use gapl_common::{Interner, InternalError};
use gapl_ir::{
    module_name, Design, Module, ModuleId, ModuleInvocation, NodeKind, PredefinedFunction, Side,
    WireRef, WireSlot,
};
use tracing::debug;

use crate::body::BodyBuilder;
use crate::error::BuildError;
use crate::expand::{Callee, Expander};

/// Mutable state carried through recursive module construction.
pub struct BuildContext<'a> {
    expander: Expander<'a>,
    interner: &'a Interner,
    design: Design,
    /// Built modules by invocation.
    cache: HashMap<ModuleInvocation, ModuleId>,
    /// Invocations currently being built, outermost first.
    stack: Vec<ModuleInvocation>,
}

impl<'a> BuildContext<'a> {
    /// Creates a context with an empty design.
    pub fn new(program: &'a Program, interner: &'a Interner) -> Self {
        Self {
            expander: Expander::new(program, interner),
            interner,
            design: Design::new(),
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Returns the interner shared with the resolver.
    pub fn interner(&self) -> &'a Interner {
        self.interner
    }

    pub(crate) fn expander(&self) -> Expander<'a> {
        self.expander
    }

    /// Returns the design built so far.
    pub fn design(&self) -> &Design {
        &self.design
    }

    /// Consumes the context and returns the design.
    pub fn into_design(self) -> Design {
        self.design
    }

    /// Marks a built module as an entry of the design.
    pub fn add_entry(&mut self, id: ModuleId) {
        self.design.add_entry(id);
    }

    /// Returns the module already built for `invocation`, if any.
    pub fn cached(&self, invocation: &ModuleInvocation) -> Option<ModuleId> {
        self.cache.get(invocation).copied()
    }

    /// Builds the module for `invocation`, or returns the one built before.
    ///
    /// Every module the invocation instantiates is built first, so the
    /// returned module only refers to modules already in the design.
    pub fn build(&mut self, invocation: &ModuleInvocation) -> Result<ModuleId, BuildError> {
        if let Some(id) = self.cached(invocation) {
            return Ok(id);
        }
        if self.stack.contains(invocation) {
            return Err(BuildError::RecursiveInstantiation {
                name: invocation.describe(self.interner),
            });
        }

        self.stack.push(invocation.clone());
        let module = self.construct(invocation);
        self.stack.pop();
        let module = module?;

        debug!(
            module = %module_name(invocation, self.interner),
            nodes = module.nodes().len(),
            connections = module.connections().len(),
            "built module"
        );
        let id = self.design.add_module(module);
        self.cache.insert(invocation.clone(), id);
        Ok(id)
    }

    fn construct(&mut self, invocation: &ModuleInvocation) -> Result<Module, BuildError> {
        let expander = self.expander;
        match expander.callee(invocation.function)? {
            Callee::Predefined(op) => {
                let function = expander.predefined(op, invocation)?;
                predefined_module(invocation.clone(), function, self.interner)
            }
            Callee::Function(definition) => {
                let bindings = expander.bind(
                    definition.name,
                    &definition.generics,
                    invocation.interfaces.clone(),
                    invocation.parameters.clone(),
                )?;
                let inputs = expander.function_ports(&definition.inputs, &bindings)?;
                let outputs = expander.function_ports(&definition.outputs, &bindings)?;
                let module = Module::new(invocation.clone(), inputs, outputs);
                BodyBuilder::new(self, module, bindings).build(&definition.statements)
            }
        }
    }
}

/// Wraps a single predefined function in a module exposing its ports.
fn predefined_module(
    invocation: ModuleInvocation,
    function: PredefinedFunction,
    interner: &Interner,
) -> Result<Module, BuildError> {
    let signature = function.signature(interner);
    let primitive_name = interner.get_or_intern(function.op().name());
    let mut module = Module::new(invocation, signature.inputs.clone(), signature.outputs.clone());
    let primitive = module.add_node(
        primitive_name,
        NodeKind::Predefined(function),
        signature.inputs.clone(),
        signature.outputs.clone(),
    );

    let data = |node, side, port: usize, leaf| WireRef {
        node,
        side,
        port: port as u32,
        slot: WireSlot::Data(leaf),
    };
    let internal = |err: gapl_ir::ConnectError| BuildError::from(InternalError::new(err.to_string()));

    for (index, port) in signature.inputs.into_iter().enumerate() {
        let width = port.structure.width();
        let io = module.add_node(port.name, NodeKind::ModuleInput, vec![], vec![port]);
        for leaf in 0..width {
            module
                .connect(data(io, Side::Output, 0, leaf), data(primitive, Side::Input, index, leaf))
                .map_err(internal)?;
        }
    }
    for (index, port) in signature.outputs.into_iter().enumerate() {
        let width = port.structure.width();
        let io = module.add_node(port.name, NodeKind::ModuleOutput, vec![port], vec![]);
        for leaf in 0..width {
            module
                .connect(data(primitive, Side::Output, index, leaf), data(io, Side::Input, 0, leaf))
                .map_err(internal)?;
        }
    }
    Ok(module)
}

/// Builds every non-generic function of `program` and everything they use.
///
/// The non-generic functions become the entries of the returned design, in
/// source order.
pub fn build_all_modules(program: &Program, interner: &Interner) -> Result<Design, BuildError> {
    let mut ctx = BuildContext::new(program, interner);
    for function in program.functions.iter().filter(|f| f.generics.is_empty()) {
        let id = ctx.build(&ModuleInvocation::plain(function.name))?;
        ctx.add_entry(id);
    }
    debug!(
        modules = ctx.design().len(),
        entries = ctx.design().entries().len(),
        "design built"
    );
    Ok(ctx.into_design())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{function, resolve};
    use gapl_cst::{
        CstBinaryOp, CstCircuitNodeExpression as N, CstCircuitStatement as S,
        CstExpression as E, CstFunctionIo as Io, CstParameterDefinition as P,
    };
    use gapl_ir::ParameterValue;

    fn pass() -> gapl_cst::CstFunctionDefinition {
        function("pass")
            .parameter(P::interface("T"))
            .input(Io::signal("a", E::atom("T")))
            .output(Io::signal("b", E::atom("T")))
            .statement(S::connect(vec![N::lone(E::atom("a")), N::lone(E::atom("b"))]))
    }

    #[test]
    fn predefined_wrapper_exposes_signature() {
        let (program, interner) = resolve(vec![], vec![]);
        let mut ctx = BuildContext::new(&program, &interner);
        let add = ModuleInvocation {
            function: interner.get_or_intern("add"),
            interfaces: vec![],
            parameters: vec![ParameterValue::Integer(32)],
        };
        let id = ctx.build(&add).unwrap();
        let module = ctx.design().module(id);
        let names: Vec<&str> = module.inputs.iter().map(|p| interner.resolve(p.name)).collect();
        assert_eq!(names, ["lhs", "rhs"]);
        assert_eq!(module.outputs.len(), 1);
        assert_eq!(interner.resolve(module.outputs[0].name), "result");
        assert!(module
            .inputs
            .iter()
            .all(|p| p.structure == gapl_ir::InterfaceStructure::bus(32)));
        assert_eq!(module.connections().len(), 96);
    }

    #[test]
    fn equal_invocations_share_a_module() {
        let top = function("top")
            .input(Io::signal("x", E::wire_vector(E::int(4))))
            .input(Io::signal("y", E::wire_vector(E::int(4))))
            .output(Io::signal("p", E::wire_vector(E::int(4))))
            .output(Io::signal("q", E::wire_vector(E::int(4))))
            .statement(S::connect(vec![
                N::lone(E::atom("x")),
                N::lone(E::call("pass", vec![E::wire_vector(E::int(4))])),
                N::lone(E::atom("p")),
            ]))
            .statement(S::connect(vec![
                N::lone(E::atom("y")),
                N::lone(E::call("pass", vec![E::wire_vector(E::binary(
                    CstBinaryOp::Add,
                    E::int(2),
                    E::int(2),
                ))])),
                N::lone(E::atom("q")),
            ]));
        let (program, interner) = resolve(vec![], vec![pass(), top]);
        let design = build_all_modules(&program, &interner).unwrap();
        assert_eq!(design.len(), 2);
        assert_eq!(design.entries().len(), 1);

        let top = design.module(design.entries()[0]);
        let instances: Vec<ModuleId> = top
            .nodes()
            .values()
            .filter_map(|n| match &n.kind {
                NodeKind::Invocation { module, .. } => Some(*module),
                _ => None,
            })
            .collect();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0], instances[1]);
    }

    #[test]
    fn cache_hit_returns_same_id() {
        let (program, interner) = resolve(vec![], vec![pass()]);
        let mut ctx = BuildContext::new(&program, &interner);
        let invocation = ModuleInvocation {
            function: interner.get_or_intern("pass"),
            interfaces: vec![gapl_ir::InterfaceStructure::Wire],
            parameters: vec![],
        };
        assert_eq!(ctx.cached(&invocation), None);
        let first = ctx.build(&invocation).unwrap();
        let second = ctx.build(&invocation).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.cached(&invocation), Some(first));
        assert_eq!(ctx.design().len(), 1);
    }

    #[test]
    fn self_instantiation_is_recursive() {
        let looping = function("looping")
            .input(Io::signal("a", E::Wire))
            .output(Io::signal("b", E::Wire))
            .statement(S::connect(vec![
                N::lone(E::atom("a")),
                N::lone(E::atom("looping")),
                N::lone(E::atom("b")),
            ]));
        let (program, interner) = resolve(vec![], vec![looping]);
        let err = build_all_modules(&program, &interner).unwrap_err();
        assert!(matches!(err, BuildError::RecursiveInstantiation { name } if name == "looping()"));
    }

    #[test]
    fn conditional_recursion_terminates() {
        // delay(n): n registers in a row, delay(0) is a plain wire.
        let n = || E::atom("n");
        let delay = function("delay")
            .parameter(P::integer("n"))
            .input(Io::signal("a", E::Wire))
            .output(Io::signal("b", E::Wire))
            .statement(S::conditional(
                E::binary(CstBinaryOp::Eq, n(), E::int(0)),
                vec![S::connect(vec![N::lone(E::atom("a")), N::lone(E::atom("b"))])],
                vec![S::connect(vec![
                    N::lone(E::atom("a")),
                    N::lone(E::call("register", vec![E::Wire])),
                    N::lone(E::call(
                        "delay",
                        vec![E::binary(CstBinaryOp::Sub, n(), E::int(1))],
                    )),
                    N::lone(E::atom("b")),
                ])],
            ));
        let (program, interner) = resolve(vec![], vec![delay]);
        let mut ctx = BuildContext::new(&program, &interner);
        let invocation = ModuleInvocation {
            function: interner.get_or_intern("delay"),
            interfaces: vec![],
            parameters: vec![ParameterValue::Integer(3)],
        };
        let id = ctx.build(&invocation).unwrap();
        assert_eq!(ctx.design().len(), 4);
        assert!(ctx.design().module(id).has_registers());
        let base = ModuleInvocation {
            parameters: vec![ParameterValue::Integer(0)],
            ..invocation
        };
        let base = ctx.cached(&base).unwrap();
        assert!(!ctx.design().module(base).has_registers());
        assert_eq!(ctx.design().module(base).connections().len(), 1);
    }

    #[test]
    fn generic_functions_are_not_entries() {
        let top = function("top")
            .input(Io::signal("a", E::Wire))
            .output(Io::signal("b", E::Wire));
        let (program, interner) = resolve(vec![], vec![pass(), top]);
        let design = build_all_modules(&program, &interner).unwrap();
        assert_eq!(design.len(), 1);
        let entry = design.module(design.entries()[0]);
        assert_eq!(interner.resolve(entry.invocation.function), "top");
    }

    #[test]
    fn unknown_function_at_top() {
        let (program, interner) = resolve(vec![], vec![]);
        let mut ctx = BuildContext::new(&program, &interner);
        let err = ctx
            .build(&ModuleInvocation::plain(interner.get_or_intern("missing")))
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownFunction { name } if name == "missing"));
    }

    #[test]
    fn generic_arity_is_checked() {
        let (program, interner) = resolve(vec![], vec![pass()]);
        let mut ctx = BuildContext::new(&program, &interner);
        let err = ctx
            .build(&ModuleInvocation::plain(interner.get_or_intern("pass")))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::GenericArity { kind: "interface", expected: 1, found: 0, .. }
        ));
        let add = ModuleInvocation {
            function: interner.get_or_intern("add"),
            interfaces: vec![],
            parameters: vec![ParameterValue::Integer(8), ParameterValue::Integer(9)],
        };
        let err = ctx.build(&add).unwrap_err();
        assert!(matches!(
            err,
            BuildError::GenericArity { kind: "parameter", expected: 1, found: 2, .. }
        ));
    }
}
