// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The context handed to a native function.

use std::any::Any;
use std::rc::Rc;

use ecow::EcoString;

use crate::interpreter::{Instance, Interpreter, RuntimeError, RuntimeErrorKind, Value, Variable};
use crate::source_analysis::Span;
use crate::types::{Class, Ty};

/// One invocation of a native member.
///
/// For instance members and constructors `this` is the receiver; for static
/// members and static field initializers it is [`Value::Null`].
pub struct NativeCall<'a> {
    interpreter: &'a Interpreter,
    class: Rc<Class>,
    this: Value,
    args: Vec<Variable>,
    span: Span,
}

impl<'a> NativeCall<'a> {
    pub(crate) fn new(
        interpreter: &'a Interpreter,
        class: Rc<Class>,
        this: Value,
        args: Vec<Variable>,
        span: Span,
    ) -> Self {
        Self {
            interpreter,
            class,
            this,
            args,
            span,
        }
    }

    #[must_use]
    pub fn interpreter(&self) -> &'a Interpreter {
        self.interpreter
    }

    /// The class the member was resolved on.
    #[must_use]
    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    #[must_use]
    pub fn this(&self) -> &Value {
        &self.this
    }

    #[must_use]
    pub fn args(&self) -> &[Variable] {
        &self.args
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// The argument at `index`.
    ///
    /// # Errors
    ///
    /// Fails when fewer arguments were passed.
    pub fn arg(&self, index: usize) -> Result<&Variable, RuntimeError> {
        self.args
            .get(index)
            .ok_or_else(|| self.fail(format!("missing argument {index}")))
    }

    /// # Errors
    ///
    /// Fails unless argument `index` holds an int.
    pub fn int_arg(&self, index: usize) -> Result<i64, RuntimeError> {
        match self.arg(index)?.value {
            Value::Int(value) => Ok(value),
            ref other => Err(self.fail(format!("expected an int argument, got {other}"))),
        }
    }

    /// # Errors
    ///
    /// Fails unless argument `index` holds a float.
    pub fn float_arg(&self, index: usize) -> Result<f64, RuntimeError> {
        match self.arg(index)?.value {
            Value::Float(value) => Ok(value),
            ref other => Err(self.fail(format!("expected a float argument, got {other}"))),
        }
    }

    /// # Errors
    ///
    /// Fails unless argument `index` holds a boolean.
    pub fn bool_arg(&self, index: usize) -> Result<bool, RuntimeError> {
        match self.arg(index)?.value {
            Value::Bool(value) => Ok(value),
            ref other => Err(self.fail(format!("expected a boolean argument, got {other}"))),
        }
    }

    /// # Errors
    ///
    /// Fails unless argument `index` holds a string. A null string is a
    /// null dereference.
    pub fn str_arg(&self, index: usize) -> Result<EcoString, RuntimeError> {
        match &self.arg(index)?.value {
            Value::Str(value) => Ok(value.clone()),
            Value::Null => Err(self.interpreter.error(
                RuntimeErrorKind::NullDereference {
                    member: "string argument".into(),
                },
                self.span,
            )),
            other => Err(self.fail(format!("expected a string argument, got {other}"))),
        }
    }

    /// The receiver as a string.
    ///
    /// # Errors
    ///
    /// Fails unless the receiver is a string.
    pub fn this_str(&self) -> Result<&EcoString, RuntimeError> {
        match &self.this {
            Value::Str(value) => Ok(value),
            other => Err(self.fail(format!("expected a string receiver, got {other}"))),
        }
    }

    /// The receiver as an object.
    ///
    /// # Errors
    ///
    /// Fails unless the receiver is an object.
    pub fn instance(&self) -> Result<&Rc<Instance>, RuntimeError> {
        match &self.this {
            Value::Object(instance) => Ok(instance),
            other => Err(self.fail(format!("expected an object receiver, got {other}"))),
        }
    }

    /// Stores host state on the receiver, replacing any earlier state.
    ///
    /// # Errors
    ///
    /// Fails unless the receiver is an object.
    pub fn init_state<T: Any>(&self, state: T) -> Result<(), RuntimeError> {
        *self.instance()?.native_state().borrow_mut() = Some(Box::new(state));
        Ok(())
    }

    /// Runs `f` on the receiver's host state.
    ///
    /// # Errors
    ///
    /// Fails when the receiver has no state of type `T`, e.g. because its
    /// native constructor never ran.
    pub fn with_state<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, RuntimeError> {
        let instance = self.instance()?;
        let mut slot = instance.native_state().borrow_mut();
        let state = slot
            .as_mut()
            .and_then(|state| state.downcast_mut::<T>())
            .ok_or_else(|| {
                self.fail(format!(
                    "{} instance was not initialized by its constructor",
                    instance.class()
                ))
            })?;
        Ok(f(state))
    }

    /// The runtime class of a concrete type.
    ///
    /// # Errors
    ///
    /// Fails when the type cannot be instantiated.
    pub fn class_of(&self, ty: &Ty) -> Result<Rc<Class>, RuntimeError> {
        self.interpreter.class_of(ty, self.span)
    }

    /// Allocates an instance of `class` without running a constructor.
    ///
    /// # Errors
    ///
    /// Fails when a field type cannot be instantiated.
    pub fn allocate(&self, class: &Rc<Class>) -> Result<Rc<Instance>, RuntimeError> {
        self.interpreter.allocate(class, self.span)
    }

    /// Constructs an instance of `class`, running the matching constructor.
    ///
    /// # Errors
    ///
    /// Propagates constructor resolution and execution failures.
    pub fn construct(&self, class: &Rc<Class>, args: Vec<Variable>) -> Result<Rc<Instance>, RuntimeError> {
        self.interpreter.construct(class, args, self.span)
    }

    /// Writes program output.
    ///
    /// # Errors
    ///
    /// Fails when the output sink fails.
    pub fn write(&self, text: &str) -> Result<(), RuntimeError> {
        self.interpreter
            .write_output(text)
            .map_err(|error| self.fail(format!("failed to write output: {error}")))
    }

    /// An [`RuntimeErrorKind::InvalidOperation`] at the call site.
    #[must_use]
    pub fn fail(&self, message: impl Into<String>) -> RuntimeError {
        self.interpreter.error(
            RuntimeErrorKind::InvalidOperation {
                message: message.into(),
            },
            self.span,
        )
    }
}
