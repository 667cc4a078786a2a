// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runtime values, variables and instances.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use ecow::EcoString;

use crate::types::{Class, Primitive, Ty};

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(EcoString),
    Object(Rc<Instance>),
    /// A class used as a receiver for static members, e.g. `Integer` in
    /// `Integer.parseInt(s)`.
    Class(Rc<Class>),
    /// A native namespace used as a field-access receiver, e.g. `java.util`.
    Namespace(EcoString),
}

impl Value {
    /// The default value of a field or local of `class`.
    #[must_use]
    pub fn default_for(class: &Class) -> Self {
        match class.primitive() {
            Some(Primitive::Int) => Self::Int(0),
            Some(Primitive::Float) => Self::Float(0.0),
            Some(Primitive::Boolean) => Self::Bool(false),
            None => Self::Null,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `==` semantics: primitives and strings by value, numbers across int
    /// and float, everything else by identity.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "int/float equality compares as float")]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Namespace(a), Self::Namespace(b)) => a == b,
            _ => false,
        }
    }
}

/// Formats a float the way the language prints it: always with a fractional
/// part (`2.0`, `0.5`).
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Object(instance) => write!(f, "{}@{:x}", instance.class(), Rc::as_ptr(instance) as usize),
            Self::Class(class) => write!(f, "{}", class.name()),
            Self::Namespace(path) => f.write_str(path),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Class(class) => write!(f, "class {}", class.name()),
            other => write!(f, "{other}"),
        }
    }
}

/// A value together with its declared type.
#[derive(Clone)]
pub struct Variable {
    pub class: Rc<Class>,
    pub value: Value,
}

impl Variable {
    #[must_use]
    pub fn new(class: Rc<Class>, value: Value) -> Self {
        Self { class, value }
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> Ty {
        self.class.as_ty()
    }

    /// The type the value actually has: the instance's class for objects,
    /// the declared type otherwise.
    #[must_use]
    pub fn runtime_ty(&self) -> Ty {
        match &self.value {
            Value::Object(instance) => instance.class().as_ty(),
            _ => self.ty(),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.value, self.class)
    }
}

/// An object.
///
/// Holds one variable per field declared anywhere on its class's ancestor
/// chain, plus a slot for host state of native ancestors.
pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<HashMap<EcoString, Variable>>,
    native: RefCell<Option<Box<dyn Any>>>,
}

impl Instance {
    pub(crate) fn new(class: Rc<Class>, fields: HashMap<EcoString, Variable>) -> Rc<Self> {
        Rc::new(Self {
            class,
            fields: RefCell::new(fields),
            native: RefCell::new(None),
        })
    }

    #[must_use]
    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<Variable> {
        self.fields.borrow().get(name).cloned()
    }

    /// Replaces a field's value, keeping its declared type. Returns false
    /// when there is no such field.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        match self.fields.borrow_mut().get_mut(name) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<EcoString> {
        let mut names: Vec<EcoString> = self.fields.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Host state owned by native constructors and methods.
    #[must_use]
    pub fn native_state(&self) -> &RefCell<Option<Box<dyn Any>>> {
        &self.native
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("fields", &self.field_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_always_show_a_fraction() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn equality_rules() {
        assert!(Value::Int(3).equals(&Value::Float(3.0)));
        assert!(Value::Str("a".into()).equals(&Value::Str("a".into())));
        assert!(!Value::Int(1).equals(&Value::Bool(true)));
        assert!(Value::Null.equals(&Value::Null));
        assert!(!Value::Null.equals(&Value::Int(0)));
    }

    #[test]
    fn display_of_primitives() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
    }
}
