// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scopes of a running program.
//!
//! **DDD Context:** Execution Engine
//!
//! A scope borrows its outer scope, so a chain lives exactly as long as the
//! Rust call that evaluates it. Invocation scopes have no outer scope; name
//! lookup that misses the chain falls back to the invocation's [`Context`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ecow::EcoString;

use super::value::{Instance, Value, Variable};
use crate::types::{CacheKey, Class, ResolutionCache, TypeParams};

/// What an invocation runs on behalf of.
#[derive(Debug, Clone)]
pub enum Context {
    /// Program level, outside any member.
    Global,
    /// A static method of a class.
    Static(Rc<Class>),
    /// An instance method or constructor. `class` is the class that declares
    /// the member, which may be an ancestor of `this`'s class.
    Instance { this: Rc<Instance>, class: Rc<Class> },
}

impl Context {
    /// The class whose members are running, if any.
    #[must_use]
    pub fn class(&self) -> Option<&Rc<Class>> {
        match self {
            Self::Global => None,
            Self::Static(class) | Self::Instance { class, .. } => Some(class),
        }
    }

    /// `this`, synthesized from the receiver.
    #[must_use]
    pub fn this(&self) -> Option<Variable> {
        match self {
            Self::Instance { this, .. } => Some(Variable::new(
                Rc::clone(this.class()),
                Value::Object(Rc::clone(this)),
            )),
            _ => None,
        }
    }

    #[must_use]
    pub fn instance(&self) -> Option<&Rc<Instance>> {
        match self {
            Self::Instance { this, .. } => Some(this),
            _ => None,
        }
    }
}

/// A lexical scope: local variables, generic bindings and a private cache of
/// resolved type names.
#[derive(Debug)]
pub struct Scope<'a> {
    outer: Option<&'a Scope<'a>>,
    context: Context,
    generics: TypeParams,
    variables: RefCell<HashMap<EcoString, Variable>>,
    cache: RefCell<ResolutionCache<Rc<Class>>>,
}

impl Scope<'static> {
    /// The program-level scope.
    #[must_use]
    pub fn global() -> Self {
        Self::invocation(Context::Global, TypeParams::default())
    }

    /// The outermost scope of a method or constructor body. `generics` binds
    /// the member's own generic parameters.
    #[must_use]
    pub fn invocation(context: Context, generics: TypeParams) -> Self {
        Self {
            outer: None,
            context,
            generics,
            variables: RefCell::new(HashMap::new()),
            cache: RefCell::new(ResolutionCache::default()),
        }
    }
}

impl<'a> Scope<'a> {
    /// A nested block scope.
    #[must_use]
    pub fn child(&'a self) -> Scope<'a> {
        Scope {
            outer: Some(self),
            context: self.context.clone(),
            generics: TypeParams::default(),
            variables: RefCell::new(HashMap::new()),
            cache: RefCell::new(ResolutionCache::default()),
        }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Binds a variable in this scope, replacing a binding of the same name.
    pub fn define(&self, name: impl Into<EcoString>, variable: Variable) {
        self.variables.borrow_mut().insert(name.into(), variable);
    }

    /// Finds a local variable on the chain.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Variable> {
        if let Some(variable) = self.variables.borrow().get(name) {
            return Some(variable.clone());
        }
        self.outer.and_then(|outer| outer.lookup(name))
    }

    /// Replaces the value of a local on the chain. Returns false when no
    /// local has this name.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if let Some(variable) = self.variables.borrow_mut().get_mut(name) {
            variable.value = value;
            return true;
        }
        self.outer.is_some_and(|outer| outer.assign(name, value))
    }

    /// The generic parameters in effect: the declaring class's, then the
    /// member's. Static members do not see class parameters.
    #[must_use]
    pub fn type_params(&self) -> TypeParams {
        let mut params = match &self.context {
            Context::Instance { class, .. } => class.params().clone(),
            Context::Global | Context::Static(_) => TypeParams::default(),
        };
        self.push_generics(&mut params);
        params
    }

    fn push_generics(&self, params: &mut TypeParams) {
        if let Some(outer) = self.outer {
            outer.push_generics(params);
        }
        params.extend(&self.generics);
    }

    /// A class previously resolved from `name` in this scope or an outer one.
    #[must_use]
    pub fn cached(&self, name: &str, key: CacheKey<'_>) -> Option<Rc<Class>> {
        if let Some(class) = self.cache.borrow().get(name, key) {
            return Some(class);
        }
        self.outer.and_then(|outer| outer.cached(name, key))
    }

    pub fn remember(&self, name: &str, key: CacheKey<'_>, class: Rc<Class>) {
        self.cache.borrow_mut().insert(name, key, class);
    }
}
