//! Generic binding, interface expansion and invocation construction.
//!
//! [`Expander`] turns resolved AST expressions into concrete IR values under a
//! set of [`Bindings`]. It never builds modules; it only needs the program to
//! look up definitions.

use crate::bindings::Bindings;
use crate::error::BuildError;
use crate::eval::{eval_static, to_size};
use gapl_ast::{
    FunctionDefinition, FunctionIo, GenericDefinitions, Instantiation, InterfaceBody,
    InterfaceExpr, IoKind, ParameterType, ParameterValueExpr, Program,
};
use gapl_common::{Ident, Interner};
use gapl_ir::{
    InterfaceKind, InterfaceStructure, ModuleInvocation, ParameterValue, PortDescription,
    PredefinedArgumentError, PredefinedFunction, PredefinedOp,
};

/// What an invocation's function name refers to.
#[derive(Debug, Clone, Copy)]
pub enum Callee<'a> {
    /// A user-defined function.
    Function(&'a FunctionDefinition),
    /// A predefined primitive.
    Predefined(PredefinedOp),
}

/// Expands AST expressions into IR values.
#[derive(Clone, Copy)]
pub struct Expander<'a> {
    program: &'a Program,
    interner: &'a Interner,
}

impl<'a> Expander<'a> {
    /// Creates an expander over a resolved program.
    pub fn new(program: &'a Program, interner: &'a Interner) -> Self {
        Self { program, interner }
    }

    fn name(&self, ident: Ident) -> String {
        self.interner.resolve(ident).to_string()
    }

    /// Looks up the definition an invocation refers to.
    pub fn callee(&self, function: Ident) -> Result<Callee<'a>, BuildError> {
        if let Some(definition) = self.program.function(function) {
            return Ok(Callee::Function(definition));
        }
        PredefinedOp::from_name(self.interner.resolve(function))
            .map(Callee::Predefined)
            .ok_or_else(|| BuildError::UnknownFunction {
                name: self.name(function),
            })
    }

    /// Expands an interface expression to its structure.
    pub fn interface(
        &self,
        expr: &InterfaceExpr,
        bindings: &Bindings,
    ) -> Result<InterfaceStructure, BuildError> {
        let structure = self.interface_in(expr, bindings, &mut Vec::new())?;
        if structure.checked_width().is_none() {
            return Err(BuildError::SizeTooLarge {
                value: i64::try_from(structure.full_width()).unwrap_or(i64::MAX),
            });
        }
        Ok(structure)
    }

    /// `active` holds the defined interfaces currently being expanded.
    fn interface_in(
        &self,
        expr: &InterfaceExpr,
        bindings: &Bindings,
        active: &mut Vec<Ident>,
    ) -> Result<InterfaceStructure, BuildError> {
        match expr {
            InterfaceExpr::Wire => Ok(InterfaceStructure::Wire),
            InterfaceExpr::Vector { element, size } => {
                let size = to_size(eval_static(size, bindings, self.interner)?)?;
                Ok(InterfaceStructure::vector(
                    self.interface_in(element, bindings, active)?,
                    size,
                ))
            }
            InterfaceExpr::Generic(name) => {
                bindings
                    .interface(*name)
                    .cloned()
                    .ok_or_else(|| BuildError::UnboundGeneric {
                        name: self.name(*name),
                    })
            }
            InterfaceExpr::Defined {
                name,
                interfaces,
                parameters,
            } => {
                let definition =
                    self.program
                        .interface(*name)
                        .ok_or_else(|| BuildError::UnknownInterface {
                            name: self.name(*name),
                        })?;
                if active.contains(name) {
                    return Err(BuildError::RecursiveInstantiation {
                        name: self.name(*name),
                    });
                }
                let interfaces = interfaces
                    .iter()
                    .map(|i| self.interface_in(i, bindings, active))
                    .collect::<Result<Vec<_>, _>>()?;
                let parameters = parameters
                    .iter()
                    .map(|p| self.parameter_value(p, bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                let inner = self.bind(*name, &definition.generics, interfaces, parameters)?;

                active.push(*name);
                let expanded = match &definition.body {
                    InterfaceBody::Alias(aliased) => self.interface_in(aliased, &inner, active),
                    InterfaceBody::Record(members) => members
                        .iter()
                        .map(|(member, expr)| {
                            Ok((*member, self.interface_in(expr, &inner, active)?))
                        })
                        .collect::<Result<Vec<_>, BuildError>>()
                        .map(InterfaceStructure::Record),
                };
                active.pop();
                expanded
            }
        }
    }

    /// Turns an instantiation into a concrete invocation.
    pub fn instantiate(
        &self,
        instantiation: &Instantiation,
        bindings: &Bindings,
    ) -> Result<ModuleInvocation, BuildError> {
        Ok(ModuleInvocation {
            function: instantiation.function,
            interfaces: instantiation
                .interfaces
                .iter()
                .map(|i| self.interface(i, bindings))
                .collect::<Result<_, _>>()?,
            parameters: instantiation
                .parameters
                .iter()
                .map(|p| self.parameter_value(p, bindings))
                .collect::<Result<_, _>>()?,
        })
    }

    fn parameter_value(
        &self,
        value: &ParameterValueExpr,
        bindings: &Bindings,
    ) -> Result<ParameterValue, BuildError> {
        match value {
            ParameterValueExpr::Static(expr) => Ok(ParameterValue::Integer(eval_static(
                expr,
                bindings,
                self.interner,
            )?)),
            ParameterValueExpr::Instantiation(instantiation) => Ok(ParameterValue::Function(
                self.instantiate(instantiation, bindings)?,
            )),
            ParameterValueExpr::FunctionReference(name) => bindings
                .function(*name)
                .cloned()
                .map(ParameterValue::Function)
                .ok_or_else(|| BuildError::UnboundGeneric {
                    name: self.name(*name),
                }),
        }
    }

    /// Binds generic values positionally to the generics of definition `owner`.
    ///
    /// Function-typed parameters are checked against their declared signature
    /// once every value is bound, so signatures may mention any generic.
    pub fn bind(
        &self,
        owner: Ident,
        generics: &GenericDefinitions,
        interfaces: Vec<InterfaceStructure>,
        parameters: Vec<ParameterValue>,
    ) -> Result<Bindings, BuildError> {
        let arity = |kind, expected, found| BuildError::GenericArity {
            name: self.name(owner),
            kind,
            expected,
            found,
        };
        if interfaces.len() != generics.interfaces.len() {
            return Err(arity("interface", generics.interfaces.len(), interfaces.len()));
        }
        if parameters.len() != generics.parameters.len() {
            return Err(arity("parameter", generics.parameters.len(), parameters.len()));
        }

        let mut bindings = Bindings::new();
        for (name, structure) in generics.interfaces.iter().zip(interfaces) {
            bindings.bind_interface(*name, structure);
        }
        for (definition, value) in generics.parameters.iter().zip(parameters) {
            let context = || {
                format!(
                    "parameter `{}` of `{}`",
                    self.name(definition.name),
                    self.name(owner)
                )
            };
            match (&definition.ty, value) {
                (ParameterType::Integer, ParameterValue::Integer(v)) => {
                    bindings.bind_integer(definition.name, v)
                }
                (ParameterType::Function { .. }, ParameterValue::Function(invocation)) => {
                    bindings.bind_function(definition.name, invocation)
                }
                (ParameterType::Integer, ParameterValue::Function(invocation)) => {
                    return Err(BuildError::TypeMismatch {
                        context: context(),
                        expected: "integer".to_string(),
                        found: format!("function `{}`", invocation.describe(self.interner)),
                    })
                }
                (ParameterType::Function { .. }, ParameterValue::Integer(v)) => {
                    return Err(BuildError::TypeMismatch {
                        context: context(),
                        expected: "function".to_string(),
                        found: format!("integer {v}"),
                    })
                }
            }
        }

        for definition in &generics.parameters {
            let ParameterType::Function { inputs, outputs } = &definition.ty else {
                continue;
            };
            let Some(invocation) = bindings.function(definition.name) else {
                continue;
            };
            let expected = (
                self.structures(inputs, &bindings)?,
                self.structures(outputs, &bindings)?,
            );
            let (actual_inputs, actual_outputs) = self.ports_of(invocation)?;
            let strip = |ports: Vec<PortDescription>| -> Vec<InterfaceStructure> {
                ports.into_iter().map(|p| p.structure).collect()
            };
            let found = (strip(actual_inputs), strip(actual_outputs));
            if expected != found {
                return Err(BuildError::TypeMismatch {
                    context: format!(
                        "parameter `{}` of `{}`",
                        self.name(definition.name),
                        self.name(owner)
                    ),
                    expected: self.describe_signature(&expected.0, &expected.1),
                    found: format!(
                        "`{}` with {}",
                        invocation.describe(self.interner),
                        self.describe_signature(&found.0, &found.1)
                    ),
                });
            }
        }
        Ok(bindings)
    }

    fn structures(
        &self,
        exprs: &[InterfaceExpr],
        bindings: &Bindings,
    ) -> Result<Vec<InterfaceStructure>, BuildError> {
        exprs.iter().map(|e| self.interface(e, bindings)).collect()
    }

    fn describe_signature(&self, inputs: &[InterfaceStructure], outputs: &[InterfaceStructure]) -> String {
        let list = |items: &[InterfaceStructure]| {
            items
                .iter()
                .map(|s| s.describe(self.interner))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("({}) => ({})", list(inputs), list(outputs))
    }

    /// Returns the input and output ports of the module an invocation denotes.
    pub fn ports_of(
        &self,
        invocation: &ModuleInvocation,
    ) -> Result<(Vec<PortDescription>, Vec<PortDescription>), BuildError> {
        match self.callee(invocation.function)? {
            Callee::Predefined(op) => {
                let signature = self.predefined(op, invocation)?.signature(self.interner);
                Ok((signature.inputs, signature.outputs))
            }
            Callee::Function(definition) => {
                let bindings = self.bind(
                    definition.name,
                    &definition.generics,
                    invocation.interfaces.clone(),
                    invocation.parameters.clone(),
                )?;
                Ok((
                    self.function_ports(&definition.inputs, &bindings)?,
                    self.function_ports(&definition.outputs, &bindings)?,
                ))
            }
        }
    }

    /// Expands the declared inputs or outputs of a function.
    pub fn function_ports(
        &self,
        ios: &[FunctionIo],
        bindings: &Bindings,
    ) -> Result<Vec<PortDescription>, BuildError> {
        ios.iter()
            .map(|io| {
                Ok(PortDescription {
                    name: io.name,
                    structure: self.interface(&io.interface, bindings)?,
                    kind: match io.kind {
                        IoKind::Signal => InterfaceKind::Signal,
                        IoKind::Stream => InterfaceKind::Stream,
                    },
                })
            })
            .collect()
    }

    /// Checks the generic values of a predefined invocation.
    pub fn predefined(
        &self,
        op: PredefinedOp,
        invocation: &ModuleInvocation,
    ) -> Result<PredefinedFunction, BuildError> {
        PredefinedFunction::from_invocation(op, invocation).map_err(|err| match err {
            PredefinedArgumentError::Arity {
                function,
                expected_interfaces,
                expected_parameters,
                found_interfaces,
                found_parameters,
            } => {
                let (kind, expected, found) = if expected_interfaces != found_interfaces {
                    ("interface", expected_interfaces, found_interfaces)
                } else {
                    ("parameter", expected_parameters, found_parameters)
                };
                BuildError::GenericArity {
                    name: function.to_string(),
                    kind,
                    expected,
                    found,
                }
            }
            PredefinedArgumentError::ExpectedInteger { function, index } => {
                BuildError::TypeMismatch {
                    context: format!("parameter {index} of `{function}`"),
                    expected: "integer".to_string(),
                    found: "function".to_string(),
                }
            }
            PredefinedArgumentError::InvalidSize { value, .. } if value < 0 => {
                BuildError::NegativeSize { value }
            }
            PredefinedArgumentError::InvalidSize { value, .. } => BuildError::SizeTooLarge { value },
        })
    }
}
