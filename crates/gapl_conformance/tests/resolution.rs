//! Scoping rules observed through the whole pipeline, and CST documents read
//! from JSON.

use gapl_conformance::{compile, compile_json, program, resolve, PipelineError};
use gapl_cst::{
    CstCircuitNodeExpression as N, CstCircuitStatement as S, CstExpression as E,
    CstFunctionDefinition as F, CstFunctionIo as Io, CstParameterDefinition as P,
};
use gapl_ir::{Side, WireRef, WireSlot};
use gapl_resolve::ResolveError;

#[test]
fn port_colliding_with_generic_is_redeclaration() {
    let function = F::new("left_pad")
        .parameter(P::integer("size"))
        .input(Io::signal("size", E::Wire));
    let Err(err) = resolve(&program(vec![], vec![function])) else {
        panic!("a port named after a generic must not resolve");
    };
    assert!(matches!(err, ResolveError::Redeclaration { ref name, .. } if name == "size"));
    assert_eq!(
        err.to_string(),
        "redeclaration of `size` in function `left_pad`"
    );
}

#[test]
fn undeclared_node_is_unresolved() {
    let function = F::new("f")
        .input(Io::signal("a", E::Wire))
        .statement(S::connect(vec![N::lone(E::atom("a")), N::lone(E::atom("nowhere"))]));
    let err = compile(&program(vec![], vec![function])).err().unwrap();
    assert!(matches!(
        err,
        PipelineError::Resolve(ResolveError::UnresolvedSymbol { ref name }) if name == "nowhere"
    ));
}

/// Declares an outer `x`, then in the taken branch either redeclares `x`
/// (shadowing) or uses the outer one.
fn scoped(predicate: bool) -> F {
    let through = |x: N| S::connect(vec![N::lone(E::atom("a")), x, N::lone(E::atom("b"))]);
    F::new("scoped")
        .input(Io::signal("a", E::Wire))
        .output(Io::signal("b", E::Wire))
        .statement(S::connect(vec![N::declared("x", E::Wire)]))
        .statement(S::conditional(
            if predicate { E::True } else { E::False },
            vec![through(N::declared("x", E::Wire))],
            vec![through(N::lone(E::atom("x")))],
        ))
}

/// The node driving `b`, and every node named `x` in creation order.
fn driver_of_b(predicate: bool) -> (gapl_ir::NodeId, Vec<gapl_ir::NodeId>) {
    let compiled = compile(&program(vec![], vec![scoped(predicate)])).unwrap();
    let (_, module) = compiled.module("scoped");
    let b = compiled.node(module, "b").unwrap();
    let driver = module
        .driver_of(WireRef {
            node: b,
            side: Side::Input,
            port: 0,
            slot: WireSlot::Data(0),
        })
        .unwrap();
    let xs = module
        .nodes()
        .iter()
        .filter(|(_, n)| compiled.interner.resolve(n.name) == "x")
        .map(|(id, _)| id)
        .collect();
    (driver.node, xs)
}

#[test]
fn inner_declaration_shadows_outer() {
    let (driver, xs) = driver_of_b(true);
    assert_eq!(xs.len(), 2);
    assert_eq!(driver, xs[1]);
}

#[test]
fn sibling_branch_sees_outer_declaration() {
    let (driver, xs) = driver_of_b(false);
    assert_eq!(xs.len(), 1);
    assert_eq!(driver, xs[0]);
}

#[test]
fn json_document_compiles() {
    let bus4 = r#"{ "accessor": { "accessed": "wire", "accessor": { "vector_item": { "index": { "int_literal": 4 } } } } }"#;
    let atom = |name: &str| format!(r#"{{ "lone": {{ "atom": {{ "identifier": "{name}" }} }} }}"#);
    let json = format!(
        r#"{{
            "function_definitions": [{{
                "declared_identifier": "invert",
                "inputs": [{{ "declared_identifier": "a", "interface_type": {bus4} }}],
                "outputs": [{{ "declared_identifier": "b", "interface_type": {bus4} }}],
                "statements": [{{ "non_conditional": {{ "connected_groups": [
                    {{ "grouped_nodes": [{a}] }},
                    {{ "grouped_nodes": [{{ "lone": {{ "atom": {{
                        "identifier": "bitwise_not",
                        "parameter_values": [{{ "int_literal": 4 }}]
                    }} }} }}] }},
                    {{ "grouped_nodes": [{b}] }}
                ] }} }}]
            }}]
        }}"#,
        a = atom("a"),
        b = atom("b"),
    );
    let compiled = compile_json(&json).unwrap();
    let (_, module) = compiled.module("invert");
    assert_eq!(compiled.input_names(module), ["a"]);
    assert_eq!(compiled.output_names(module), ["b"]);
    assert_eq!(module.connections().len(), 8);
}

#[test]
fn malformed_json_is_rejected() {
    let err = compile_json(r#"{ "function_definitions": [{ "inputs": [] }] }"#)
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Json(_)));
}
