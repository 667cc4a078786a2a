// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression evaluation.

use std::rc::Rc;

use super::invoke::argument_types;
use super::operators;
use super::scope::Scope;
use super::value::{Value, Variable};
use super::{Interpreter, RuntimeError, RuntimeErrorKind};
use crate::ast::{AssignOperator, Expression, Identifier, IncrementOperator, Literal};
use crate::native::NamespaceEntry;
use crate::source_analysis::Span;
use crate::types::{Class, Ty, check};

impl Interpreter {
    /// Evaluates an expression to a typed value.
    pub(crate) fn eval(
        &self,
        scope: &Scope<'_>,
        expression: &Expression,
    ) -> Result<Variable, RuntimeError> {
        match expression {
            Expression::Literal { value, span } => self.literal(value, *span),
            Expression::Variable(name) => self.lookup(scope, name),
            Expression::Binary {
                lhs,
                operator,
                rhs,
                span,
            } => {
                let lhs = self.eval(scope, lhs)?;
                let rhs = self.eval(scope, rhs)?;
                let value = operators::binary(*operator, &lhs.value, &rhs.value)
                    .map_err(|message| self.invalid(message, *span))?;
                self.typed(value, *span)
            }
            Expression::Unary {
                operator,
                operand,
                span,
            } => {
                let operand = self.eval(scope, operand)?;
                let value = operators::unary(*operator, &operand.value)
                    .map_err(|message| self.invalid(message, *span))?;
                self.typed(value, *span)
            }
            Expression::Increment {
                operator,
                prefix,
                target,
                span,
            } => self.increment(scope, *operator, *prefix, target, *span),
            Expression::Ternary {
                condition,
                then_value,
                else_value,
                span,
            } => match self.eval(scope, condition)?.value {
                Value::Bool(true) => self.eval(scope, then_value),
                Value::Bool(false) => self.eval(scope, else_value),
                other => Err(self.invalid(
                    format!("Condition must be a boolean, got {other:?}"),
                    *span,
                )),
            },
            Expression::New {
                ty,
                arguments,
                span,
            } => {
                let class = self.resolve_type(scope, ty)?;
                let args = self.eval_all(scope, arguments)?;
                let arg_types = argument_types(arguments, &args);
                let instance = self.instantiate(&class, args, &arg_types, *span)?;
                Ok(Variable::new(class, Value::Object(instance)))
            }
            Expression::FieldAccess {
                receiver,
                field,
                span,
            } => {
                let receiver = self.eval(scope, receiver)?.value;
                self.field_value(&receiver, field, *span)
            }
            Expression::MethodCall {
                receiver,
                method,
                arguments,
                span,
            } => {
                let result = self.method_call(scope, receiver, method, arguments, *span)?;
                match result {
                    Some(variable) => Ok(variable),
                    None => Ok(Variable::new(self.class_of(&Ty::object(), *span)?, Value::Null)),
                }
            }
            Expression::Cast {
                ty,
                expression,
                ..
            } => {
                let class = self.resolve_type(scope, ty)?;
                let value = self.eval(scope, expression)?.value;
                Ok(Variable::new(class, value))
            }
            Expression::InstanceOf {
                expression,
                ty,
                span,
            } => {
                let target = self.resolve_type(scope, ty)?;
                let variable = self.eval(scope, expression)?;
                let result = match &variable.value {
                    Value::Null => false,
                    Value::Str(_) => check(self.table(), &Ty::string(), &target.as_ty()),
                    _ => check(self.table(), &variable.runtime_ty(), &target.as_ty()),
                };
                self.typed(Value::Bool(result), *span)
            }
            Expression::Group { expression, .. } => self.eval(scope, expression),
        }
    }

    /// `++`/`--` on a local or a field. Yields the new value when `prefix`,
    /// the old one otherwise.
    fn increment(
        &self,
        scope: &Scope<'_>,
        operator: IncrementOperator,
        prefix: bool,
        target: &Expression,
        span: Span,
    ) -> Result<Variable, RuntimeError> {
        let step = |current: &Value| {
            operators::step(operator, current).map_err(|message| self.invalid(message, span))
        };
        let (current, next) = match target {
            Expression::Variable(name) => {
                let current = self.lookup(scope, name)?;
                let next = step(&current.value)?;
                self.store(scope, name, next.clone())?;
                (current, next)
            }
            Expression::FieldAccess {
                receiver, field, ..
            } => {
                let receiver = self.eval(scope, receiver)?.value;
                let current = self.field_value(&receiver, field, span)?;
                let next = step(&current.value)?;
                self.store_field(&receiver, field, AssignOperator::Assign, next.clone(), span)?;
                (current, next)
            }
            other => {
                return Err(self.invalid(format!("Can't apply '{operator}' to {other:?}"), span));
            }
        };
        let value = if prefix { next } else { current.value };
        Ok(Variable::new(current.class, value))
    }

    pub(super) fn eval_all(
        &self,
        scope: &Scope<'_>,
        arguments: &[Expression],
    ) -> Result<Vec<Variable>, RuntimeError> {
        arguments
            .iter()
            .map(|argument| self.eval(scope, argument))
            .collect()
    }

    fn invalid(&self, message: String, span: Span) -> RuntimeError {
        self.error(RuntimeErrorKind::InvalidOperation { message }, span)
    }

    fn literal(&self, literal: &Literal, span: Span) -> Result<Variable, RuntimeError> {
        let (ty, value) = match literal {
            Literal::Int(value) => (Ty::int(), Value::Int(*value)),
            Literal::Float(value) => (Ty::float(), Value::Float(*value)),
            Literal::Bool(value) => (Ty::boolean(), Value::Bool(*value)),
            Literal::String(value) => (Ty::string(), Value::Str(value.clone())),
            Literal::Null => (Ty::object(), Value::Null),
        };
        Ok(Variable::new(self.class_of(&ty, span)?, value))
    }

    /// Types an operator result by its value.
    fn typed(&self, value: Value, span: Span) -> Result<Variable, RuntimeError> {
        let ty = match &value {
            Value::Int(_) => Ty::int(),
            Value::Float(_) => Ty::float(),
            Value::Bool(_) => Ty::boolean(),
            Value::Str(_) => Ty::string(),
            Value::Object(instance) => return Ok(Variable::new(Rc::clone(instance.class()), value)),
            Value::Class(class) => return Ok(Variable::new(Rc::clone(class), value)),
            Value::Null | Value::Namespace(_) => Ty::object(),
        };
        Ok(Variable::new(self.class_of(&ty, span)?, value))
    }

    /// Resolves a bare name: `this`, a local, a field of the running
    /// instance, a class, then a native namespace.
    pub(crate) fn lookup(
        &self,
        scope: &Scope<'_>,
        name: &Identifier,
    ) -> Result<Variable, RuntimeError> {
        let undefined = || {
            self.error(
                RuntimeErrorKind::UndefinedVariable {
                    name: name.name.clone(),
                },
                name.span,
            )
        };
        if name.name == "this" {
            return scope.context().this().ok_or_else(undefined);
        }
        if let Some(variable) = scope.lookup(&name.name) {
            return Ok(variable);
        }
        if let Some(field) = scope
            .context()
            .instance()
            .and_then(|instance| instance.field(&name.name))
        {
            return Ok(field);
        }
        if let Some(class) = self.static_class(scope, &name.name, name.span)? {
            return Ok(Variable::new(Rc::clone(&class), Value::Class(class)));
        }
        if self.table().natives().namespace(&name.name).is_some() {
            return self.typed(Value::Namespace(name.name.clone()), name.span);
        }
        Err(undefined())
    }

    /// `receiver.field` for a namespace, a class or an object receiver.
    fn field_value(
        &self,
        receiver: &Value,
        field: &Identifier,
        span: Span,
    ) -> Result<Variable, RuntimeError> {
        match receiver {
            Value::Namespace(path) => {
                let child = format!("{path}.{}", field.name);
                match self.table().natives().lookup(&child) {
                    Some(NamespaceEntry::Namespace(_)) => {
                        self.typed(Value::Namespace(child.into()), span)
                    }
                    Some(NamespaceEntry::Class(_)) => {
                        let view = self.types(self.registry.static_view(&child, span))?;
                        Ok(Variable::new(Rc::clone(&view), Value::Class(view)))
                    }
                    None => Err(self.error(
                        RuntimeErrorKind::UndefinedVariable { name: child.into() },
                        field.span,
                    )),
                }
            }
            Value::Class(class) => self.static_field(class, &field.name, span),
            Value::Object(instance) => instance
                .field(&field.name)
                .ok_or_else(|| self.undefined_field(receiver, field)),
            Value::Null => Err(self.error(
                RuntimeErrorKind::NullDereference {
                    member: field.name.clone(),
                },
                span,
            )),
            _ => Err(self.undefined_field(receiver, field)),
        }
    }

    fn method_call(
        &self,
        scope: &Scope<'_>,
        receiver: &Expression,
        method: &Identifier,
        arguments: &[Expression],
        span: Span,
    ) -> Result<Option<Variable>, RuntimeError> {
        let receiver = self.eval(scope, receiver)?;
        let args = self.eval_all(scope, arguments)?;
        let arg_types = argument_types(arguments, &args);
        let (class, is_static): (Rc<Class>, bool) = match &receiver.value {
            Value::Null => {
                return Err(self.error(
                    RuntimeErrorKind::NullDereference {
                        member: method.name.clone(),
                    },
                    span,
                ));
            }
            Value::Object(instance) => (Rc::clone(instance.class()), false),
            Value::Class(class) => (Rc::clone(class), true),
            Value::Str(_) => (self.class_of(&Ty::string(), span)?, false),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => (Rc::clone(&receiver.class), false),
            Value::Namespace(path) => {
                return Err(self.invalid(format!("'{path}' is a namespace, not a value"), span));
            }
        };
        let this = if is_static { Value::Null } else { receiver.value };
        self.dispatch(&class, this, &method.name, is_static, args, &arg_types, span)
    }
}
