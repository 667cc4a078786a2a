// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The program-wide memo of instantiated classes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ecow::EcoString;
use tracing::debug;

use super::binder::{Bindings, substitute};
use super::class::{Class, FieldSlot, Member};
use super::table::{ClassTable, TypeParams};
use super::ty::{ClassTy, Generic, Ty};
use super::TypeError;
use crate::source_analysis::Span;

/// Instantiates runtime classes, once per (name, generic arguments).
///
/// Asking twice for `Box<java.lang.Integer>` returns the same `Rc`.
#[derive(Debug)]
pub struct TypeRegistry {
    table: Rc<ClassTable>,
    instances: RefCell<HashMap<ClassTy, Rc<Class>>>,
    static_views: RefCell<HashMap<EcoString, Rc<Class>>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new(table: Rc<ClassTable>) -> Self {
        Self {
            table,
            instances: RefCell::new(HashMap::new()),
            static_views: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn table(&self) -> &ClassTable {
        &self.table
    }

    /// Number of distinct instantiations made so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }

    /// The runtime class for a concrete type.
    ///
    /// # Errors
    ///
    /// Fails when `ty` still mentions an unbound generic, names no class, or
    /// has the wrong number of generic arguments.
    pub fn class_of(&self, ty: &Ty, span: Span) -> Result<Rc<Class>, TypeError> {
        match ty.resolved() {
            Ty::Class(class) => self.instantiate(&class, span),
            Ty::Generic(Generic { name, .. }) => Err(TypeError::UnboundGeneric { name, span }),
        }
    }

    /// Instantiates `ty`, or returns the existing instantiation.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::class_of`].
    pub fn instantiate(&self, ty: &ClassTy, span: Span) -> Result<Rc<Class>, TypeError> {
        let args: Vec<Ty> = ty.args.iter().map(Ty::resolved).collect();
        if let Some(name) = args.iter().find_map(Ty::first_unbound) {
            return Err(TypeError::UnboundGeneric {
                name: name.clone(),
                span,
            });
        }
        let key = ClassTy {
            name: ty.name.clone(),
            args,
        };
        if let Some(class) = self.instances.borrow().get(&key) {
            return Ok(Rc::clone(class));
        }

        let template = Rc::clone(self.table.template(&key.name, span)?);
        if template.generics.len() != key.args.len() {
            return Err(TypeError::GenericArity {
                name: key.name.clone(),
                expected: template.generics.len(),
                given: key.args.len(),
                span,
            });
        }
        let bindings: Bindings = template
            .generics
            .iter()
            .cloned()
            .zip(key.args.iter().cloned())
            .collect();
        let base = match &template.base {
            Some(base) => Some(self.class_of(&substitute(base, &bindings), span)?),
            None => None,
        };
        let class = Rc::new(Class {
            params: TypeParams::bound(&template.generics, &key.args),
            fields: template
                .fields
                .iter()
                .map(|field| FieldSlot {
                    name: field.name.clone(),
                    ty: substitute(&field.ty, &bindings),
                })
                .collect(),
            constructors: template
                .constructors
                .iter()
                .cloned()
                .map(Member::new)
                .collect(),
            methods: template.methods.iter().cloned().map(Member::new).collect(),
            is_static_view: false,
            base,
            template,
            ty: key.clone(),
        });
        debug!(class = %key, "instantiated class");
        self.instances.borrow_mut().insert(key, Rc::clone(&class));
        Ok(class)
    }

    /// The generic-less view of a class used for static member access.
    ///
    /// # Errors
    ///
    /// Fails when `name` is not a known class.
    pub fn static_view(&self, name: &str, span: Span) -> Result<Rc<Class>, TypeError> {
        if let Some(class) = self.static_views.borrow().get(name) {
            return Ok(Rc::clone(class));
        }
        let template = Rc::clone(self.table.template(name, span)?);
        let base = match &template.base {
            Some(base) => Some(self.static_view(base.name(), span)?),
            None => None,
        };
        let class = Rc::new(Class {
            ty: ClassTy {
                name: template.name.clone(),
                args: Vec::new(),
            },
            params: TypeParams::unbound(&template.generics),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: template.methods.iter().cloned().map(Member::new).collect(),
            is_static_view: true,
            base,
            template,
        });
        self.static_views
            .borrow_mut()
            .insert(EcoString::from(name), Rc::clone(&class));
        Ok(class)
    }
}
