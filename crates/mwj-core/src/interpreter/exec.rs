// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement execution.

use super::operators;
use super::scope::Scope;
use super::value::{Value, Variable};
use super::{Interpreter, RuntimeError, RuntimeErrorKind};
use crate::ast::{AssignOperator, Expression, Identifier, Statement};
use crate::source_analysis::Span;

/// How a statement finished.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    /// A `return` is unwinding to the invocation; `None` for `return;`.
    Return(Option<Variable>),
}

impl Interpreter {
    /// Runs `statements` in `scope`, stopping at the first `return`.
    pub(crate) fn exec_block(
        &self,
        scope: &Scope<'_>,
        statements: &[Statement],
    ) -> Result<Flow, RuntimeError> {
        for statement in statements {
            if let Flow::Return(value) = self.exec(scope, statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&self, scope: &Scope<'_>, statement: &Statement) -> Result<Flow, RuntimeError> {
        if let Some(observer) = self.observer() {
            observer.on_statement(statement, self.depth());
        }
        match statement {
            Statement::LocalVariable { ty, name, value, .. } => {
                let class = self.resolve_type(scope, ty)?;
                let value = match value {
                    Some(value) => self.eval(scope, value)?.value,
                    None => Value::default_for(&class),
                };
                scope.define(name.name.clone(), Variable::new(class, value));
            }
            Statement::Assign {
                target,
                operator,
                value,
                span,
            } => self.assign_name(scope, target, *operator, value, *span)?,
            Statement::FieldAssign {
                receiver,
                field,
                operator,
                value,
                span,
            } => self.assign_field(scope, receiver, field, *operator, value, *span)?,
            Statement::Expression { expression, .. } => {
                self.eval(scope, expression)?;
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let branch = if self.condition(scope, condition)? {
                    Some(then_branch)
                } else {
                    else_branch.as_ref()
                };
                if let Some(branch) = branch {
                    return self.exec_block(&scope.child(), branch);
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                while self.condition(scope, condition)? {
                    if let Flow::Return(value) = self.exec_block(&scope.child(), body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                let header = scope.child();
                self.exec(&header, init)?;
                while self.condition(&header, condition)? {
                    if let Flow::Return(value) = self.exec_block(&header.child(), body)? {
                        return Ok(Flow::Return(value));
                    }
                    self.exec(&header, update)?;
                }
            }
            Statement::Return { value, .. } => {
                let value = value
                    .as_ref()
                    .map(|value| self.eval(scope, value))
                    .transpose()?;
                return Ok(Flow::Return(value));
            }
            Statement::Block { statements, .. } => {
                return self.exec_block(&scope.child(), statements);
            }
        }
        Ok(Flow::Normal)
    }

    fn condition(&self, scope: &Scope<'_>, condition: &Expression) -> Result<bool, RuntimeError> {
        match self.eval(scope, condition)?.value {
            Value::Bool(value) => Ok(value),
            other => Err(self.error(
                RuntimeErrorKind::InvalidOperation {
                    message: format!("Condition must be a boolean, got {other:?}"),
                },
                condition.span(),
            )),
        }
    }

    /// The value an assignment stores: `value` itself for `=`, otherwise
    /// `current op value`.
    pub(crate) fn combine(
        &self,
        operator: AssignOperator,
        current: impl FnOnce() -> Result<Value, RuntimeError>,
        value: Value,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match operator.binary() {
            None => Ok(value),
            Some(op) => operators::binary(op, &current()?, &value)
                .map_err(|message| self.error(RuntimeErrorKind::InvalidOperation { message }, span)),
        }
    }

    fn assign_name(
        &self,
        scope: &Scope<'_>,
        target: &Identifier,
        operator: AssignOperator,
        value: &Expression,
        span: Span,
    ) -> Result<(), RuntimeError> {
        let value = self.eval(scope, value)?.value;
        let value = self.combine(
            operator,
            || Ok(self.lookup(scope, target)?.value),
            value,
            span,
        )?;
        self.store(scope, target, value)
    }

    /// Stores into a local, or else a field of the running instance.
    pub(crate) fn store(
        &self,
        scope: &Scope<'_>,
        target: &Identifier,
        value: Value,
    ) -> Result<(), RuntimeError> {
        if target.name == "this" {
            return Err(self.error(
                RuntimeErrorKind::InvalidOperation {
                    message: "Can't assign to 'this'".into(),
                },
                target.span,
            ));
        }
        if scope.assign(&target.name, value.clone()) {
            return Ok(());
        }
        if let Some(instance) = scope.context().instance() {
            if instance.set_field(&target.name, value) {
                return Ok(());
            }
        }
        Err(self.error(
            RuntimeErrorKind::UndefinedVariable {
                name: target.name.clone(),
            },
            target.span,
        ))
    }

    fn assign_field(
        &self,
        scope: &Scope<'_>,
        receiver: &Expression,
        field: &Identifier,
        operator: AssignOperator,
        value: &Expression,
        span: Span,
    ) -> Result<(), RuntimeError> {
        let receiver = self.eval(scope, receiver)?.value;
        let value = self.eval(scope, value)?.value;
        self.store_field(&receiver, field, operator, value, span)
    }

    pub(crate) fn store_field(
        &self,
        receiver: &Value,
        field: &Identifier,
        operator: AssignOperator,
        value: Value,
        span: Span,
    ) -> Result<(), RuntimeError> {
        match receiver {
            Value::Object(instance) => {
                let value = self.combine(
                    operator,
                    || {
                        instance.field(&field.name).map(|f| f.value).ok_or_else(|| {
                            self.undefined_field(receiver, field)
                        })
                    },
                    value,
                    span,
                )?;
                if instance.set_field(&field.name, value) {
                    Ok(())
                } else {
                    Err(self.undefined_field(receiver, field))
                }
            }
            Value::Null => Err(self.error(
                RuntimeErrorKind::NullDereference {
                    member: field.name.clone(),
                },
                span,
            )),
            Value::Class(class) => Err(self.error(
                RuntimeErrorKind::InvalidOperation {
                    message: format!("Static field '{}.{}' is read-only", class.name(), field.name),
                },
                span,
            )),
            _ => Err(self.undefined_field(receiver, field)),
        }
    }

    pub(crate) fn undefined_field(&self, receiver: &Value, field: &Identifier) -> RuntimeError {
        let owner = match receiver {
            Value::Object(instance) => instance.class().name().clone(),
            other => format!("{other:?}").into(),
        };
        self.error(
            RuntimeErrorKind::UndefinedVariable {
                name: format!("{owner}.{}", field.name).into(),
            },
            field.span,
        )
    }
}
