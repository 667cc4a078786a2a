// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Member resolution: which method or constructor a call selects.
//!
//! The algorithm is written once and run against two universes of classes
//! through [`MemberSource`]: the analyzer's declared types and the engine's
//! instantiated runtime classes.
//!
//! For methods, candidates are the members declared directly on the class
//! with the requested name and static-ness. A candidate applies when the
//! arity matches and every argument passes [`check`] against its parameter,
//! both before and after the method's generic parameters are bound from the
//! arguments. One applicable candidate is selected; several are an ambiguity
//! that is reported, never tie-broken; none moves the search to the base
//! class. Constructors are never inherited.

use std::fmt;
use std::rc::Rc;

use ecow::EcoString;

use super::binder::{Bindings, bind, substitute};
use super::subtype::check;
use super::table::ClassTable;
use super::ty::{Signature, Ty, TypeList};
use super::TypeError;

/// A universe of classes the resolver can enumerate members from.
pub trait MemberSource {
    /// A class in this universe.
    type Owner: Clone;
    /// A member handle returned with a selection.
    type Member: Clone;

    fn table(&self) -> &ClassTable;

    fn owner_name(&self, owner: &Self::Owner) -> EcoString;

    /// The direct base class, or `None` at the root.
    ///
    /// # Errors
    ///
    /// Fails when the base's type cannot be resolved.
    fn base(&self, owner: &Self::Owner) -> Result<Option<Self::Owner>, TypeError>;

    /// Methods declared directly on `owner` with this name and static-ness.
    ///
    /// # Errors
    ///
    /// Fails when a candidate's signature cannot be typed.
    fn methods(
        &self,
        owner: &Self::Owner,
        name: &str,
        is_static: bool,
    ) -> Result<Vec<(Self::Member, Rc<Signature>)>, TypeError>;

    /// Constructors declared directly on `owner`.
    ///
    /// # Errors
    ///
    /// Fails when a candidate's signature cannot be typed.
    fn constructors(
        &self,
        owner: &Self::Owner,
    ) -> Result<Vec<(Self::Member, Rc<Signature>)>, TypeError>;
}

/// The member a call resolved to.
#[derive(Debug, Clone)]
pub struct Selected<O, M> {
    /// The class that declares the member.
    pub owner: O,
    pub member: M,
    pub signature: Rc<Signature>,
    /// Method generic parameters bound by the arguments.
    pub bindings: Bindings,
}

impl<O, M> Selected<O, M> {
    /// The return type with the call's bindings applied.
    #[must_use]
    pub fn return_type(&self) -> Option<Ty> {
        self.signature
            .return_type
            .as_ref()
            .map(|ty| substitute(ty, &self.bindings))
    }
}

/// More than one candidate applied at the same class.
#[derive(Debug, Clone, PartialEq)]
pub struct Ambiguity {
    pub class: EcoString,
    pub member: EcoString,
    pub arguments: Vec<Ty>,
    pub candidates: Vec<Rc<Signature>>,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous arguments for '{}.{}' - ({}) fits ",
            self.class,
            self.member,
            TypeList(&self.arguments)
        )?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}

/// No candidate applied anywhere on the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Missing {
    pub class: EcoString,
    pub member: EcoString,
    pub arguments: Vec<Ty>,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No member '{}' of '{}' accepts ({})",
            self.member,
            self.class,
            TypeList(&self.arguments)
        )
    }
}

/// The outcome of resolving a call.
#[derive(Debug, Clone)]
pub enum Resolution<O, M> {
    Found(Selected<O, M>),
    /// A class without constructors was constructed with no arguments; the
    /// base's zero-argument constructor runs instead.
    DefaultConstructor,
    Ambiguous(Ambiguity),
    Missing(Missing),
}

/// The candidate filter: returns the generic bindings when `signature`
/// accepts arguments of types `args`.
#[must_use]
pub fn applicable(table: &ClassTable, signature: &Signature, args: &[Ty]) -> Option<Bindings> {
    let params = signature.param_types();
    if params.len() != args.len() {
        return None;
    }
    let accepts = |params: &[Ty]| {
        args.iter()
            .zip(params)
            .all(|(arg, param)| check(table, arg, param))
    };
    if !accepts(&params) {
        return None;
    }
    let bindings = bind(&params, args);
    let substituted: Vec<Ty> = params.iter().map(|p| substitute(p, &bindings)).collect();
    accepts(&substituted).then_some(bindings)
}

type Matches<M> = Vec<(M, Rc<Signature>, Bindings)>;

fn filter<M>(table: &ClassTable, candidates: Vec<(M, Rc<Signature>)>, args: &[Ty]) -> Matches<M> {
    candidates
        .into_iter()
        .filter_map(|(member, signature)| {
            applicable(table, &signature, args).map(|bindings| (member, signature, bindings))
        })
        .collect()
}

/// Resolves a method call on `owner`.
///
/// # Errors
///
/// Fails only when a candidate's types cannot be resolved; "not found" and
/// "ambiguous" are [`Resolution`] outcomes.
pub fn resolve_method<S: MemberSource>(
    source: &S,
    owner: &S::Owner,
    name: &str,
    is_static: bool,
    args: &[Ty],
) -> Result<Resolution<S::Owner, S::Member>, TypeError> {
    let mut current = owner.clone();
    loop {
        let candidates = source.methods(&current, name, is_static)?;
        let mut matches = filter(source.table(), candidates, args);
        if matches.len() > 1 {
            return Ok(Resolution::Ambiguous(Ambiguity {
                class: source.owner_name(&current),
                member: name.into(),
                arguments: args.to_vec(),
                candidates: matches.into_iter().map(|(_, signature, _)| signature).collect(),
            }));
        }
        if let Some((member, signature, bindings)) = matches.pop() {
            return Ok(Resolution::Found(Selected {
                owner: current,
                member,
                signature,
                bindings,
            }));
        }
        match source.base(&current)? {
            Some(base) => current = base,
            None => {
                return Ok(Resolution::Missing(Missing {
                    class: source.owner_name(owner),
                    member: name.into(),
                    arguments: args.to_vec(),
                }));
            }
        }
    }
}

/// Resolves a constructor of `owner`. Constructors are not inherited.
///
/// # Errors
///
/// Fails only when a candidate's types cannot be resolved.
pub fn resolve_constructor<S: MemberSource>(
    source: &S,
    owner: &S::Owner,
    args: &[Ty],
) -> Result<Resolution<S::Owner, S::Member>, TypeError> {
    let candidates = source.constructors(owner)?;
    if candidates.is_empty() && args.is_empty() {
        return Ok(Resolution::DefaultConstructor);
    }
    let class = source.owner_name(owner);
    let mut matches = filter(source.table(), candidates, args);
    if matches.len() > 1 {
        return Ok(Resolution::Ambiguous(Ambiguity {
            member: class.clone(),
            class,
            arguments: args.to_vec(),
            candidates: matches.into_iter().map(|(_, signature, _)| signature).collect(),
        }));
    }
    Ok(match matches.pop() {
        Some((member, signature, bindings)) => Resolution::Found(Selected {
            owner: owner.clone(),
            member,
            signature,
            bindings,
        }),
        None => Resolution::Missing(Missing {
            member: class.clone(),
            class,
            arguments: args.to_vec(),
        }),
    })
}
