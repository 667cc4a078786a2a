// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Native extension protocol.
//!
//! **DDD Context:** Runtime
//!
//! Host-implemented classes are declared with [`NativeClass::builder`]: a
//! namespace path, a name, generic parameters, an optional base, and
//! constructors, methods and static fields backed by Rust functions with
//! written parameter and return types. Registered classes join the same
//! class table as source-declared ones, so resolution, subtype checks and
//! instantiation treat both alike.
//!
//! ```
//! use mwj_core::interpreter::Value;
//! use mwj_core::native::{NativeCall, NativeClass, NativeRegistry};
//!
//! fn answer(_call: &NativeCall<'_>) -> Result<Value, mwj_core::RuntimeError> {
//!     Ok(Value::Int(42))
//! }
//!
//! let mut natives = NativeRegistry::standard();
//! natives.register(
//!     NativeClass::builder("demo", "Oracle")
//!         .static_method("answer", &[], Some("int"), answer)
//!         .build(),
//! );
//! assert!(natives.class("demo.Oracle").is_some());
//! ```

mod call;
pub mod stdlib;

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use ecow::EcoString;
use tracing::debug;

use crate::ast::TypeExpr;
use crate::interpreter::{RuntimeError, Value};

pub use call::NativeCall;

/// A host function backing a native member or static field initializer.
pub type NativeFn = fn(&NativeCall<'_>) -> Result<Value, RuntimeError>;

/// A native constructor or method.
#[derive(Debug, Clone)]
pub struct NativeMember {
    pub name: EcoString,
    pub is_static: bool,
    pub is_constructor: bool,
    pub generics: Vec<EcoString>,
    /// `(type, name)` pairs, as written in a declaration.
    pub params: Vec<(TypeExpr, EcoString)>,
    pub return_type: Option<TypeExpr>,
    pub function: NativeFn,
}

/// A host-initialized static field, such as `System.out`.
#[derive(Debug, Clone)]
pub struct NativeStaticField {
    pub name: EcoString,
    pub ty: TypeExpr,
    /// Called once, on first access.
    pub init: NativeFn,
}

/// A host-implemented class.
#[derive(Debug, Clone)]
pub struct NativeClass {
    namespace: EcoString,
    name: EcoString,
    fqn: EcoString,
    generics: Vec<EcoString>,
    base: Option<TypeExpr>,
    constructors: Vec<NativeMember>,
    methods: Vec<NativeMember>,
    static_fields: Vec<NativeStaticField>,
    method_names: BTreeSet<EcoString>,
}

impl NativeClass {
    /// Starts declaring `namespace.name`, e.g. `("java.util", "List")`.
    #[must_use]
    pub fn builder(namespace: &str, name: &str) -> NativeClassBuilder {
        NativeClassBuilder {
            namespace: namespace.into(),
            name: name.into(),
            generics: Vec::new(),
            base: None,
            constructors: Vec::new(),
            methods: Vec::new(),
            static_fields: Vec::new(),
        }
    }

    /// Simple name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// Fully-qualified name.
    #[must_use]
    pub fn fqn(&self) -> &EcoString {
        &self.fqn
    }

    #[must_use]
    pub fn namespace(&self) -> &EcoString {
        &self.namespace
    }

    #[must_use]
    pub fn generics(&self) -> &[EcoString] {
        &self.generics
    }

    #[must_use]
    pub fn base(&self) -> Option<&TypeExpr> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn constructors(&self) -> &[NativeMember] {
        &self.constructors
    }

    #[must_use]
    pub fn methods(&self) -> &[NativeMember] {
        &self.methods
    }

    /// Names of all exposed methods.
    #[must_use]
    pub fn method_names(&self) -> &BTreeSet<EcoString> {
        &self.method_names
    }

    #[must_use]
    pub fn static_field(&self, name: &str) -> Option<&NativeStaticField> {
        self.static_fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn static_fields(&self) -> &[NativeStaticField] {
        &self.static_fields
    }
}

/// Declares a [`NativeClass`]. Types are written as in source, e.g.
/// `"java.util.List<E>"`, and resolved when the class table is built.
#[derive(Debug, Clone)]
pub struct NativeClassBuilder {
    namespace: EcoString,
    name: EcoString,
    generics: Vec<EcoString>,
    base: Option<TypeExpr>,
    constructors: Vec<NativeMember>,
    methods: Vec<NativeMember>,
    static_fields: Vec<NativeStaticField>,
}

fn written_params(params: &[(&str, &str)]) -> Vec<(TypeExpr, EcoString)> {
    params
        .iter()
        .map(|(ty, name)| (TypeExpr::parse(ty), EcoString::from(*name)))
        .collect()
}

impl NativeClassBuilder {
    #[must_use]
    pub fn generics(mut self, names: &[&str]) -> Self {
        self.generics = names.iter().map(|name| EcoString::from(*name)).collect();
        self
    }

    #[must_use]
    pub fn extends(mut self, base: &str) -> Self {
        self.base = Some(TypeExpr::parse(base));
        self
    }

    /// Adds a constructor taking `(type, name)` parameters.
    #[must_use]
    pub fn constructor(mut self, params: &[(&str, &str)], function: NativeFn) -> Self {
        self.constructors.push(NativeMember {
            name: self.name.clone(),
            is_static: false,
            is_constructor: true,
            generics: Vec::new(),
            params: written_params(params),
            return_type: None,
            function,
        });
        self
    }

    /// Adds an instance method. `return_type` of `None` means `void`.
    #[must_use]
    pub fn method(
        self,
        name: &str,
        params: &[(&str, &str)],
        return_type: Option<&str>,
        function: NativeFn,
    ) -> Self {
        self.add_method(name, false, params, return_type, function)
    }

    #[must_use]
    pub fn static_method(
        self,
        name: &str,
        params: &[(&str, &str)],
        return_type: Option<&str>,
        function: NativeFn,
    ) -> Self {
        self.add_method(name, true, params, return_type, function)
    }

    fn add_method(
        mut self,
        name: &str,
        is_static: bool,
        params: &[(&str, &str)],
        return_type: Option<&str>,
        function: NativeFn,
    ) -> Self {
        self.methods.push(NativeMember {
            name: name.into(),
            is_static,
            is_constructor: false,
            generics: Vec::new(),
            params: written_params(params),
            return_type: return_type.map(TypeExpr::parse),
            function,
        });
        self
    }

    /// Adds a static field initialized by `init` on first access.
    #[must_use]
    pub fn static_field(mut self, name: &str, ty: &str, init: NativeFn) -> Self {
        self.static_fields.push(NativeStaticField {
            name: name.into(),
            ty: TypeExpr::parse(ty),
            init,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> NativeClass {
        let fqn = if self.namespace.is_empty() {
            self.name.clone()
        } else {
            let mut fqn = self.namespace.clone();
            fqn.push('.');
            fqn.push_str(&self.name);
            fqn
        };
        let method_names = self.methods.iter().map(|m| m.name.clone()).collect();
        NativeClass {
            namespace: self.namespace,
            name: self.name,
            fqn,
            generics: self.generics,
            base: self.base,
            constructors: self.constructors,
            methods: self.methods,
            static_fields: self.static_fields,
            method_names,
        }
    }
}

/// A node of the native namespace tree.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    path: EcoString,
    namespaces: BTreeMap<EcoString, Namespace>,
    classes: BTreeMap<EcoString, Rc<NativeClass>>,
}

/// What a dotted path names.
#[derive(Debug, Clone, Copy)]
pub enum NamespaceEntry<'a> {
    Namespace(&'a Namespace),
    Class(&'a Rc<NativeClass>),
}

impl Namespace {
    /// Dotted path; empty for the root.
    #[must_use]
    pub fn path(&self) -> &EcoString {
        &self.path
    }

    /// A direct child. A namespace shadows a class of the same name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NamespaceEntry<'_>> {
        self.namespaces
            .get(name)
            .map(NamespaceEntry::Namespace)
            .or_else(|| self.classes.get(name).map(NamespaceEntry::Class))
    }

    /// Classes directly in this namespace, in name order.
    pub fn classes(&self) -> impl Iterator<Item = &Rc<NativeClass>> {
        self.classes.values()
    }

    fn collect_classes<'a>(&'a self, out: &mut Vec<&'a Rc<NativeClass>>) {
        out.extend(self.classes.values());
        for namespace in self.namespaces.values() {
            namespace.collect_classes(out);
        }
    }

    fn child_mut(&mut self, name: &str) -> &mut Namespace {
        let path = if self.path.is_empty() {
            EcoString::from(name)
        } else {
            let mut path = self.path.clone();
            path.push('.');
            path.push_str(name);
            path
        };
        self.namespaces
            .entry(name.into())
            .or_insert_with(|| Namespace {
                path,
                ..Namespace::default()
            })
    }
}

/// All native classes available to a program, as a namespace tree.
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    root: Namespace,
}

impl NativeRegistry {
    /// A registry with no classes at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the bundled `java.lang`, `java.io` and `java.util`.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        stdlib::register(&mut registry);
        registry
    }

    /// Adds a class, creating its namespaces as needed. A class registered
    /// twice replaces the earlier declaration.
    pub fn register(&mut self, class: NativeClass) -> Rc<NativeClass> {
        let mut namespace = &mut self.root;
        for segment in class.namespace.split('.').filter(|s| !s.is_empty()) {
            namespace = namespace.child_mut(segment);
        }
        let class = Rc::new(class);
        debug!(class = %class.fqn(), "registered native class");
        namespace
            .classes
            .insert(class.name.clone(), Rc::clone(&class));
        class
    }

    /// Looks up a dotted path such as `java.util` or `java.util.List`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<NamespaceEntry<'_>> {
        let mut segments = path.split('.');
        let mut entry = self.root.get(segments.next()?)?;
        for segment in segments {
            match entry {
                NamespaceEntry::Namespace(namespace) => entry = namespace.get(segment)?,
                NamespaceEntry::Class(_) => return None,
            }
        }
        Some(entry)
    }

    #[must_use]
    pub fn namespace(&self, path: &str) -> Option<&Namespace> {
        match self.lookup(path)? {
            NamespaceEntry::Namespace(namespace) => Some(namespace),
            NamespaceEntry::Class(_) => None,
        }
    }

    #[must_use]
    pub fn class(&self, fqn: &str) -> Option<&Rc<NativeClass>> {
        match self.lookup(fqn)? {
            NamespaceEntry::Class(class) => Some(class),
            NamespaceEntry::Namespace(_) => None,
        }
    }

    /// Every registered class, namespace by namespace in name order.
    #[must_use]
    pub fn classes(&self) -> Vec<&Rc<NativeClass>> {
        let mut classes = Vec::new();
        self.root.collect_classes(&mut classes);
        classes
    }
}
