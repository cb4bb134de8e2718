//! CST to AST resolution.
//!
//! Each function body is resolved in two passes. The first hoists every
//! declared node of a scope so statements may refer to nodes declared later.
//! The second classifies each expression as static, interface or circuit
//! and checks every name against the scope chain.

use crate::error::ResolveError;
use crate::scope::{Declaration, Scope, ScopeKind};
use gapl_ast::{
    Accessor, BinaryOp, CircuitExpr, CircuitGroup, CircuitNode, FunctionDefinition, FunctionIo,
    GenericDefinitions, Instantiation, InterfaceBody, InterfaceDefinition, InterfaceExpr, IoKind,
    NodeBody, ParameterDefinition, ParameterType, ParameterValueExpr, Program, Statement,
    StaticExpr,
};
use gapl_common::{Ident, Interner};
use gapl_cst::{
    CstAccessor, CstBinaryOp, CstCircuitExpression, CstCircuitNodeExpression, CstCircuitStatement,
    CstExpression, CstFunctionDefinition, CstFunctionIo, CstInterfaceDefinition, CstIoKind,
    CstParameterDefinition, CstParameterType, CstProgram,
};
use tracing::debug;

/// Resolves every name in `program`, interning names into `interner`.
pub fn resolve_program(program: &CstProgram, interner: &Interner) -> Result<Program, ResolveError> {
    Resolver { interner }.program(program)
}

struct Resolver<'i> {
    interner: &'i Interner,
}

/// A generic value classified as an interface or a parameter.
enum GenericValue {
    Interface(InterfaceExpr),
    Parameter(ParameterValueExpr),
}

impl Resolver<'_> {
    fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    fn mismatch<T>(&self, expected: &'static str, found: impl Into<String>) -> Result<T, ResolveError> {
        Err(ResolveError::TypeMismatch {
            expected,
            found: found.into(),
        })
    }

    fn declared(&self, declaration: Declaration, name: Ident) -> String {
        format!("{} `{}`", declaration.describe(), self.interner.resolve(name))
    }

    fn program(&self, program: &CstProgram) -> Result<Program, ResolveError> {
        let mut symbols = Vec::new();
        for def in &program.interface_definitions {
            symbols.push((self.intern(def.declared_identifier()), Declaration::Interface));
        }
        for def in &program.function_definitions {
            symbols.push((self.intern(&def.declared_identifier), Declaration::Function));
        }
        let scope = Scope::root(ScopeKind::Program, symbols, self.interner)?;

        let interfaces = program
            .interface_definitions
            .iter()
            .map(|def| self.interface_definition(def, &scope))
            .collect::<Result<Vec<_>, _>>()?;
        let functions = program
            .function_definitions
            .iter()
            .map(|def| self.function_definition(def, &scope))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program {
            interfaces,
            functions,
        })
    }

    fn generic_symbols(&self, defs: &[CstParameterDefinition]) -> Vec<(Ident, Declaration)> {
        defs.iter()
            .map(|def| {
                let declaration = match def.ty {
                    CstParameterType::Integer => Declaration::IntegerParameter,
                    CstParameterType::Interface => Declaration::GenericInterface,
                    CstParameterType::Function { .. } => Declaration::FunctionParameter,
                };
                (self.intern(&def.declared_identifier), declaration)
            })
            .collect()
    }

    fn generics(
        &self,
        defs: &[CstParameterDefinition],
        scope: &Scope<'_>,
    ) -> Result<GenericDefinitions, ResolveError> {
        let mut generics = GenericDefinitions::default();
        for def in defs {
            let name = self.intern(&def.declared_identifier);
            let ty = match &def.ty {
                CstParameterType::Interface => {
                    generics.interfaces.push(name);
                    continue;
                }
                CstParameterType::Integer => ParameterType::Integer,
                CstParameterType::Function { inputs, outputs } => ParameterType::Function {
                    inputs: self.interfaces(inputs, scope)?,
                    outputs: self.interfaces(outputs, scope)?,
                },
            };
            generics.parameters.push(ParameterDefinition { name, ty });
        }
        Ok(generics)
    }

    fn interfaces(
        &self,
        exprs: &[CstExpression],
        scope: &Scope<'_>,
    ) -> Result<Vec<InterfaceExpr>, ResolveError> {
        exprs.iter().map(|e| self.interface(e, scope)).collect()
    }

    fn interface_definition(
        &self,
        def: &CstInterfaceDefinition,
        program: &Scope<'_>,
    ) -> Result<InterfaceDefinition, ResolveError> {
        let name = self.intern(def.declared_identifier());
        let scope = program.child(
            ScopeKind::Interface(name),
            self.generic_symbols(def.parameter_definitions()),
            self.interner,
        )?;
        let generics = self.generics(def.parameter_definitions(), &scope)?;
        let body = match def {
            CstInterfaceDefinition::Alias {
                aliased_interface, ..
            } => InterfaceBody::Alias(self.interface(aliased_interface, &scope)?),
            CstInterfaceDefinition::Record { ports, .. } => {
                let mut members: Vec<(Ident, InterfaceExpr)> = Vec::with_capacity(ports.len());
                for port in ports {
                    let member = self.intern(&port.declared_identifier);
                    if members.iter().any(|(n, _)| *n == member) {
                        return Err(ResolveError::Redeclaration {
                            name: port.declared_identifier.clone(),
                            scope: format!("interface `{}`", def.declared_identifier()),
                        });
                    }
                    members.push((member, self.interface(&port.interface_type, &scope)?));
                }
                InterfaceBody::Record(members)
            }
        };
        Ok(InterfaceDefinition {
            name,
            generics,
            body,
        })
    }

    fn function_definition(
        &self,
        def: &CstFunctionDefinition,
        program: &Scope<'_>,
    ) -> Result<FunctionDefinition, ResolveError> {
        let name = self.intern(&def.declared_identifier);
        let mut symbols = self.generic_symbols(&def.parameter_definitions);
        symbols.extend(def.inputs.iter().map(|io| (self.intern(&io.declared_identifier), Declaration::Input)));
        symbols.extend(def.outputs.iter().map(|io| (self.intern(&io.declared_identifier), Declaration::Output)));
        symbols.extend(self.hoist(&def.statements));
        let scope = program.child(ScopeKind::Function(name), symbols, self.interner)?;

        let function = FunctionDefinition {
            name,
            generics: self.generics(&def.parameter_definitions, &scope)?,
            inputs: self.function_ios(&def.inputs, &scope)?,
            outputs: self.function_ios(&def.outputs, &scope)?,
            statements: self.statements(&def.statements, &scope)?,
        };
        debug!(function = %def.declared_identifier, "resolved function");
        Ok(function)
    }

    fn function_ios(&self, ios: &[CstFunctionIo], scope: &Scope<'_>) -> Result<Vec<FunctionIo>, ResolveError> {
        ios.iter()
            .map(|io| {
                Ok(FunctionIo {
                    name: self.intern(&io.declared_identifier),
                    kind: match io.kind {
                        CstIoKind::Signal => IoKind::Signal,
                        CstIoKind::Stream => IoKind::Stream,
                    },
                    interface: self.interface(&io.interface_type, scope)?,
                })
            })
            .collect()
    }

    /// Declared nodes of the unconditional statements, including nested chains.
    fn hoist(&self, statements: &[CstCircuitStatement]) -> Vec<(Ident, Declaration)> {
        let mut out = Vec::new();
        for statement in statements {
            if let CstCircuitStatement::NonConditional(chain) = statement {
                self.hoist_chain(chain, &mut out);
            }
        }
        out
    }

    fn hoist_chain(&self, chain: &CstCircuitExpression, out: &mut Vec<(Ident, Declaration)>) {
        for node in chain.connected_groups.iter().flat_map(|g| &g.grouped_nodes) {
            match node {
                CstCircuitNodeExpression::Declared {
                    declared_identifier,
                    ..
                } => out.push((self.intern(declared_identifier), Declaration::Node)),
                CstCircuitNodeExpression::Parentheses(nested) => self.hoist_chain(nested, out),
                CstCircuitNodeExpression::Lone(_) => {}
            }
        }
    }

    fn statements(
        &self,
        statements: &[CstCircuitStatement],
        scope: &Scope<'_>,
    ) -> Result<Vec<Statement>, ResolveError> {
        statements
            .iter()
            .map(|statement| match statement {
                CstCircuitStatement::Conditional {
                    predicate,
                    if_body,
                    else_body,
                } => Ok(Statement::Conditional {
                    predicate: self.static_expr(predicate, scope)?,
                    if_body: self.branch(if_body, scope)?,
                    else_body: self.branch(else_body, scope)?,
                }),
                CstCircuitStatement::NonConditional(chain) => {
                    Ok(Statement::Connection(self.chain(chain, scope)?))
                }
            })
            .collect()
    }

    fn branch(
        &self,
        statements: &[CstCircuitStatement],
        parent: &Scope<'_>,
    ) -> Result<Vec<Statement>, ResolveError> {
        let scope = parent.child(ScopeKind::Conditional, self.hoist(statements), self.interner)?;
        self.statements(statements, &scope)
    }

    fn chain(&self, chain: &CstCircuitExpression, scope: &Scope<'_>) -> Result<CircuitExpr, ResolveError> {
        let groups = chain
            .connected_groups
            .iter()
            .map(|group| {
                let nodes = group
                    .grouped_nodes
                    .iter()
                    .map(|node| self.circuit_node(node, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CircuitGroup { nodes })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;
        Ok(CircuitExpr { groups })
    }

    fn circuit_node(
        &self,
        node: &CstCircuitNodeExpression,
        scope: &Scope<'_>,
    ) -> Result<CircuitNode, ResolveError> {
        match node {
            CstCircuitNodeExpression::Lone(expr) => self.lone(expr, scope),
            CstCircuitNodeExpression::Declared {
                declared_identifier,
                ty,
            } => match self.lone(ty, scope)? {
                CircuitNode::Anonymous(body) => Ok(CircuitNode::Declared {
                    name: self.intern(declared_identifier),
                    body,
                }),
                _ => self.mismatch(
                    "function or interface as node type",
                    format!("reference in the declaration of `{declared_identifier}`"),
                ),
            },
            CstCircuitNodeExpression::Parentheses(nested) => {
                Ok(CircuitNode::Nested(self.chain(nested, scope)?))
            }
        }
    }

    /// A bare expression in a chain: a reference or an anonymous node.
    fn lone(&self, expr: &CstExpression, scope: &Scope<'_>) -> Result<CircuitNode, ResolveError> {
        match expr {
            CstExpression::Atom {
                identifier,
                parameter_values,
            } => {
                let name = self.intern(identifier);
                match scope.resolve(name, self.interner)? {
                    declaration @ (Declaration::Input | Declaration::Output | Declaration::Node) => {
                        if !parameter_values.is_empty() {
                            return self.mismatch(
                                "reference without generic values",
                                self.declared(declaration, name),
                            );
                        }
                        Ok(CircuitNode::Reference {
                            name,
                            accessors: Vec::new(),
                        })
                    }
                    Declaration::Interface | Declaration::GenericInterface => Ok(
                        CircuitNode::Anonymous(NodeBody::Interface(self.interface(expr, scope)?)),
                    ),
                    Declaration::Function | Declaration::Predefined => Ok(CircuitNode::Anonymous(
                        NodeBody::Function(self.instantiation(name, parameter_values, scope)?),
                    )),
                    Declaration::FunctionParameter => {
                        if !parameter_values.is_empty() {
                            return self.mismatch(
                                "function parameter without generic values",
                                self.declared(Declaration::FunctionParameter, name),
                            );
                        }
                        Ok(CircuitNode::Anonymous(NodeBody::GenericFunction(name)))
                    }
                    Declaration::IntegerParameter => {
                        self.mismatch("circuit node", self.declared(Declaration::IntegerParameter, name))
                    }
                }
            }
            CstExpression::Accessor { accessed, accessor } => match self.lone(accessed, scope)? {
                CircuitNode::Reference {
                    name,
                    mut accessors,
                } => {
                    accessors.push(self.accessor(accessor, scope)?);
                    Ok(CircuitNode::Reference { name, accessors })
                }
                CircuitNode::Anonymous(NodeBody::Interface(element)) => match accessor {
                    CstAccessor::VectorItem { index } => {
                        Ok(CircuitNode::Anonymous(NodeBody::Interface(InterfaceExpr::Vector {
                            element: Box::new(element),
                            size: self.static_expr(index, scope)?,
                        })))
                    }
                    _ => self.mismatch("vector size on an interface", "member or slice access"),
                },
                _ => self.mismatch("port or node reference", "access on a function instance"),
            },
            CstExpression::Wire => Ok(CircuitNode::Anonymous(NodeBody::Interface(InterfaceExpr::Wire))),
            CstExpression::Parenthesized(inner) => self.lone(inner, scope),
            CstExpression::True
            | CstExpression::False
            | CstExpression::IntLiteral(_)
            | CstExpression::Binary { .. } => self.mismatch("circuit node", "static expression"),
        }
    }

    fn accessor(&self, accessor: &CstAccessor, scope: &Scope<'_>) -> Result<Accessor, ResolveError> {
        Ok(match accessor {
            CstAccessor::Member { port_identifier } => Accessor::Member(self.intern(port_identifier)),
            CstAccessor::VectorItem { index } => Accessor::Index(self.static_expr(index, scope)?),
            CstAccessor::VectorSlice { start, end } => {
                Accessor::Slice(self.static_expr(start, scope)?, self.static_expr(end, scope)?)
            }
        })
    }

    fn instantiation(
        &self,
        function: Ident,
        values: &[CstExpression],
        scope: &Scope<'_>,
    ) -> Result<Instantiation, ResolveError> {
        let (interfaces, parameters) = self.generic_values(values, scope)?;
        Ok(Instantiation {
            function,
            interfaces,
            parameters,
        })
    }

    /// Splits generic values into interface values and parameter values, keeping order.
    fn generic_values(
        &self,
        values: &[CstExpression],
        scope: &Scope<'_>,
    ) -> Result<(Vec<InterfaceExpr>, Vec<ParameterValueExpr>), ResolveError> {
        let mut interfaces = Vec::new();
        let mut parameters = Vec::new();
        for value in values {
            match self.generic_value(value, scope)? {
                GenericValue::Interface(i) => interfaces.push(i),
                GenericValue::Parameter(p) => parameters.push(p),
            }
        }
        Ok((interfaces, parameters))
    }

    fn generic_value(&self, value: &CstExpression, scope: &Scope<'_>) -> Result<GenericValue, ResolveError> {
        match value {
            CstExpression::IntLiteral(_)
            | CstExpression::True
            | CstExpression::False
            | CstExpression::Binary { .. } => Ok(GenericValue::Parameter(ParameterValueExpr::Static(
                self.static_expr(value, scope)?,
            ))),
            CstExpression::Parenthesized(inner) => self.generic_value(inner, scope),
            CstExpression::Wire | CstExpression::Accessor { .. } => {
                Ok(GenericValue::Interface(self.interface(value, scope)?))
            }
            CstExpression::Atom {
                identifier,
                parameter_values,
            } => {
                let name = self.intern(identifier);
                match scope.resolve(name, self.interner)? {
                    Declaration::Function | Declaration::Predefined => Ok(GenericValue::Parameter(
                        ParameterValueExpr::Instantiation(self.instantiation(name, parameter_values, scope)?),
                    )),
                    Declaration::IntegerParameter => Ok(GenericValue::Parameter(
                        ParameterValueExpr::Static(self.static_expr(value, scope)?),
                    )),
                    Declaration::FunctionParameter if parameter_values.is_empty() => {
                        Ok(GenericValue::Parameter(ParameterValueExpr::FunctionReference(name)))
                    }
                    Declaration::Interface | Declaration::GenericInterface => {
                        Ok(GenericValue::Interface(self.interface(value, scope)?))
                    }
                    declaration => self.mismatch("generic value", self.declared(declaration, name)),
                }
            }
        }
    }

    fn interface(&self, expr: &CstExpression, scope: &Scope<'_>) -> Result<InterfaceExpr, ResolveError> {
        match expr {
            CstExpression::Wire => Ok(InterfaceExpr::Wire),
            CstExpression::Atom {
                identifier,
                parameter_values,
            } => {
                let name = self.intern(identifier);
                match scope.resolve(name, self.interner)? {
                    Declaration::GenericInterface if parameter_values.is_empty() => {
                        Ok(InterfaceExpr::Generic(name))
                    }
                    Declaration::Interface => {
                        let (interfaces, parameters) = self.generic_values(parameter_values, scope)?;
                        Ok(InterfaceExpr::Defined {
                            name,
                            interfaces,
                            parameters,
                        })
                    }
                    declaration => self.mismatch("interface", self.declared(declaration, name)),
                }
            }
            CstExpression::Accessor {
                accessed,
                accessor: CstAccessor::VectorItem { index },
            } => Ok(InterfaceExpr::Vector {
                element: Box::new(self.interface(accessed, scope)?),
                size: self.static_expr(index, scope)?,
            }),
            CstExpression::Accessor { .. } => self.mismatch("interface", "member or slice access"),
            CstExpression::Parenthesized(inner) => self.interface(inner, scope),
            CstExpression::True
            | CstExpression::False
            | CstExpression::IntLiteral(_)
            | CstExpression::Binary { .. } => self.mismatch("interface", "static expression"),
        }
    }

    fn static_expr(&self, expr: &CstExpression, scope: &Scope<'_>) -> Result<StaticExpr, ResolveError> {
        match expr {
            CstExpression::IntLiteral(v) => Ok(StaticExpr::Int(*v)),
            CstExpression::True => Ok(StaticExpr::Bool(true)),
            CstExpression::False => Ok(StaticExpr::Bool(false)),
            CstExpression::Parenthesized(inner) => self.static_expr(inner, scope),
            CstExpression::Binary { op, lhs, rhs } => Ok(StaticExpr::Binary {
                op: binary_op(*op),
                lhs: Box::new(self.static_expr(lhs, scope)?),
                rhs: Box::new(self.static_expr(rhs, scope)?),
            }),
            CstExpression::Atom {
                identifier,
                parameter_values,
            } => {
                let name = self.intern(identifier);
                match scope.resolve(name, self.interner)? {
                    Declaration::IntegerParameter if parameter_values.is_empty() => {
                        Ok(StaticExpr::Param(name))
                    }
                    declaration => self.mismatch("static expression", self.declared(declaration, name)),
                }
            }
            CstExpression::Wire => self.mismatch("static expression", "`wire`"),
            CstExpression::Accessor { .. } => self.mismatch("static expression", "accessor"),
        }
    }
}

fn binary_op(op: CstBinaryOp) -> BinaryOp {
    match op {
        CstBinaryOp::Mul => BinaryOp::Mul,
        CstBinaryOp::Div => BinaryOp::Div,
        CstBinaryOp::Add => BinaryOp::Add,
        CstBinaryOp::Sub => BinaryOp::Sub,
        CstBinaryOp::Lt => BinaryOp::Lt,
        CstBinaryOp::Gt => BinaryOp::Gt,
        CstBinaryOp::Le => BinaryOp::Le,
        CstBinaryOp::Ge => BinaryOp::Ge,
        CstBinaryOp::Eq => BinaryOp::Eq,
        CstBinaryOp::Ne => BinaryOp::Ne,
        CstBinaryOp::And => BinaryOp::And,
        CstBinaryOp::Or => BinaryOp::Or,
    }
}
