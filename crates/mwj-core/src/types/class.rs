// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runtime classes: templates applied to concrete generic arguments.

use std::cell::OnceCell;
use std::rc::Rc;

use ecow::EcoString;

use super::table::{ClassTable, ClassTemplate, MemberTemplate, Primitive, TypeParams};
use super::ty::{ClassTy, Signature, Ty};
use super::TypeError;

/// A field of a runtime class with its concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub name: EcoString,
    pub ty: Ty,
}

/// A method or constructor of a runtime class.
///
/// The signature is typed on first use and kept.
#[derive(Debug)]
pub struct Member {
    template: Rc<MemberTemplate>,
    signature: OnceCell<Rc<Signature>>,
}

impl Member {
    pub(super) fn new(template: Rc<MemberTemplate>) -> Self {
        Self {
            template,
            signature: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn template(&self) -> &Rc<MemberTemplate> {
        &self.template
    }

    /// The typed signature, computed against the owning class's parameters.
    ///
    /// # Errors
    ///
    /// Fails when a written parameter or return type does not resolve.
    pub fn signature(
        &self,
        table: &ClassTable,
        params: &TypeParams,
    ) -> Result<Rc<Signature>, TypeError> {
        if let Some(signature) = self.signature.get() {
            return Ok(Rc::clone(signature));
        }
        let signature = Rc::new(table.signature(&self.template, params)?);
        Ok(Rc::clone(self.signature.get_or_init(|| signature)))
    }
}

/// A class as the engine sees it: one per distinct instantiation.
///
/// Created only by [`TypeRegistry`](super::TypeRegistry), which hands out
/// shared references so that equal instantiations are the same object.
#[derive(Debug)]
pub struct Class {
    pub(super) ty: ClassTy,
    pub(super) template: Rc<ClassTemplate>,
    pub(super) is_static_view: bool,
    pub(super) params: TypeParams,
    pub(super) base: Option<Rc<Class>>,
    pub(super) fields: Vec<FieldSlot>,
    pub(super) constructors: Vec<Member>,
    pub(super) methods: Vec<Member>,
}

impl Class {
    /// The instantiated type, e.g. `java.util.List<int>`.
    #[must_use]
    pub fn ty(&self) -> &ClassTy {
        &self.ty
    }

    #[must_use]
    pub fn as_ty(&self) -> Ty {
        Ty::Class(self.ty.clone())
    }

    /// Fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.ty.name
    }

    #[must_use]
    pub fn template(&self) -> &Rc<ClassTemplate> {
        &self.template
    }

    /// True for the generic-less view used for static member access.
    #[must_use]
    pub fn is_static_view(&self) -> bool {
        self.is_static_view
    }

    /// The class's generic parameters bound to its arguments.
    #[must_use]
    pub fn params(&self) -> &TypeParams {
        &self.params
    }

    #[must_use]
    pub fn base(&self) -> Option<&Rc<Class>> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        self.template.primitive()
    }

    /// Fields declared directly on this class.
    #[must_use]
    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    /// Fields declared on this class and every ancestor, most derived first.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldSlot> {
        std::iter::successors(Some(self), |class| class.base.as_deref())
            .flat_map(|class| class.fields.iter())
    }

    /// Finds a field anywhere on the chain.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.all_fields().find(|field| field.name == name)
    }

    #[must_use]
    pub fn constructors(&self) -> &[Member] {
        &self.constructors
    }

    /// Methods declared directly on this class, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Member] {
        &self.methods
    }

    /// Methods declared directly on this class with this name and static-ness.
    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
        is_static: bool,
    ) -> impl Iterator<Item = &'a Member> + 'a {
        self.methods.iter().filter(move |member| {
            member.template.name == name && member.template.is_static == is_static
        })
    }

    /// The typed signature of one of this class's members.
    ///
    /// # Errors
    ///
    /// Fails when a written parameter or return type does not resolve.
    pub fn signature(&self, member: &Member, table: &ClassTable) -> Result<Rc<Signature>, TypeError> {
        member.signature(table, &self.params)
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ty)
    }
}
