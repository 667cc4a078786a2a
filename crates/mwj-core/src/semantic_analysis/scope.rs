// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Local variable tracking for type checking.
//!
//! **DDD Context:** Semantic Analysis
//!
//! Levels mirror the engine's scopes: one for a member's parameters and top
//! level body, and one more per nested block, branch and loop.

use std::collections::HashMap;

use ecow::EcoString;

use crate::source_analysis::Span;
use crate::types::Ty;

/// The kind of binding in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Local variable, including `for` loop variables.
    Local,
    /// Method or constructor parameter.
    Parameter,
    /// The synthesized `this` of instance members.
    This,
}

/// A declared name with its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: EcoString,
    pub ty: Ty,
    pub defined_at: Span,
    pub depth: usize,
    pub kind: BindingKind,
}

/// Tracks variable definitions across nested scopes.
#[derive(Debug, Clone)]
pub struct Scope {
    levels: Vec<HashMap<EcoString, Binding>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// A scope with one level for a member's parameters and body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.levels.push(HashMap::new());
    }

    /// Exits the innermost level. The member level is never popped.
    pub fn pop(&mut self) -> bool {
        if self.levels.len() > 1 {
            self.levels.pop();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Defines a name in the innermost level. Returns the existing binding
    /// instead when the name is already declared at that level.
    pub fn define(
        &mut self,
        name: &EcoString,
        ty: Ty,
        span: Span,
        kind: BindingKind,
    ) -> Result<(), &Binding> {
        let depth = self.current_depth();
        let Some(level) = self.levels.last_mut() else {
            return Ok(());
        };
        if level.contains_key(name) {
            return Err(&level[name]);
        }
        level.insert(
            name.clone(),
            Binding {
                name: name.clone(),
                ty,
                defined_at: span,
                depth,
                kind,
            },
        );
        Ok(())
    }

    /// Looks up a name, innermost level first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.levels.iter().rev().find_map(|level| level.get(name))
    }
}
