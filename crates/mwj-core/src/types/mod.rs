// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type model, generic binder and member resolver.
//!
//! **DDD Context:** Type System
//!
//! Both passes decide the same questions: which class a written type names,
//! whether one type is acceptable where another is expected, how a method's
//! generic parameters bind at a call site, and which member a call selects.
//! Those decisions live here once:
//!
//! - [`ClassTable`] holds every class declaration (source, native and
//!   primitive) and the cached ancestor chains
//! - [`check`] is the subtype relation
//! - [`fill`] and [`substitute`] are the generic binder
//! - [`resolve_method`] and [`resolve_constructor`] walk candidates through a
//!   [`MemberSource`], which is either the analyzer's declared-type view or
//!   the engine's runtime-class view
//! - [`TypeRegistry`] instantiates runtime [`Class`]es once per distinct
//!   generic instantiation

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

mod binder;
mod cache;
mod class;
mod imports;
mod members;
pub mod operators;
mod registry;
mod resolver;
mod subtype;
mod table;
mod ty;


use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::Span;

pub use binder::{Bindings, bind, fill, substitute};
pub use cache::{CacheKey, ResolutionCache};
pub use class::{Class, FieldSlot, Member};
pub use imports::ImportTable;
pub use members::{MemberIndex, RuntimeMembers, StaticMembers};
pub use registry::TypeRegistry;
pub use resolver::{
    Ambiguity, MemberSource, Missing, Resolution, Selected, applicable, resolve_constructor,
    resolve_method,
};
pub use subtype::check;
pub use table::{
    ClassOrigin, ClassTable, ClassTemplate, FieldTemplate, MemberBody, MemberTemplate, Primitive,
    TypeParams,
};
pub use ty::{
    BOOLEAN, ClassTy, FLOAT, Generic, INT, NULL, OBJECT, Param, STRING, Signature, Ty,
};

/// A failure to turn written types into type values.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TypeError {
    #[error("Unknown type '{name}'")]
    #[diagnostic(code(mwj::types::unknown_type))]
    UnknownType { name: EcoString, span: Span },

    #[error("Type '{name}' expects {expected} generic argument(s), got {given}")]
    #[diagnostic(code(mwj::types::generic_arity))]
    GenericArity {
        name: EcoString,
        expected: usize,
        given: usize,
        span: Span,
    },

    #[error("Class '{name}' is defined more than once")]
    #[diagnostic(code(mwj::types::duplicate_class))]
    DuplicateClass { name: EcoString, span: Span },

    #[error("Inheritance cycle through class '{name}'")]
    #[diagnostic(code(mwj::types::inheritance_cycle))]
    InheritanceCycle { name: EcoString, span: Span },

    #[error("Class '{class}' can't extend generic parameter '{base}'")]
    #[diagnostic(code(mwj::types::generic_base))]
    GenericBase {
        class: EcoString,
        base: EcoString,
        span: Span,
    },

    #[error("Generic parameter '{name}' is not bound to a type")]
    #[diagnostic(code(mwj::types::unbound_generic))]
    UnboundGeneric { name: EcoString, span: Span },
}

impl TypeError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::UnknownType { span, .. }
            | Self::GenericArity { span, .. }
            | Self::DuplicateClass { span, .. }
            | Self::InheritanceCycle { span, .. }
            | Self::GenericBase { span, .. }
            | Self::UnboundGeneric { span, .. } => *span,
        }
    }

    pub(crate) fn unknown(name: impl Into<EcoString>, span: Span) -> Self {
        Self::UnknownType {
            name: name.into(),
            span,
        }
    }
}
