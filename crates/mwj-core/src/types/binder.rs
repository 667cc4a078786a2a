// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generic binder: unifies formal parameter types with actual argument types.

use std::collections::HashMap;

use ecow::EcoString;

use super::ty::{Generic, Ty};

/// Generic parameter name → the type it stands for at one call site.
pub type Bindings = HashMap<EcoString, Ty>;

/// Pairs each unbound generic occurring in `formals` with the actual type in
/// the same position.
///
/// A bare unbound formal binds to the whole actual. A parameterized formal
/// such as `List<T>` recurses into its generic arguments against the actual's.
/// Pairs are yielded in parameter order; a name may appear more than once.
#[must_use]
pub fn fill(formals: &[Ty], actuals: &[Ty]) -> Vec<(EcoString, Ty)> {
    let mut pairs = Vec::new();
    for (formal, actual) in formals.iter().zip(actuals) {
        fill_one(formal, actual, &mut pairs);
    }
    pairs
}

fn fill_one(formal: &Ty, actual: &Ty, pairs: &mut Vec<(EcoString, Ty)>) {
    match formal {
        // A null argument leaves the parameter unbound.
        Ty::Generic(Generic { bound: None, .. }) if actual.is_null() => {}
        Ty::Generic(Generic { name, bound: None }) => pairs.push((name.clone(), actual.resolved())),
        Ty::Generic(_) => {}
        Ty::Class(formal) => {
            if let Ty::Class(actual) = actual.resolved() {
                for (formal, actual) in formal.args.iter().zip(&actual.args) {
                    fill_one(formal, actual, pairs);
                }
            }
        }
    }
}

/// [`fill`] collected into a map; the last pair for a name wins.
#[must_use]
pub fn bind(formals: &[Ty], actuals: &[Ty]) -> Bindings {
    fill(formals, actuals).into_iter().collect()
}

/// Replaces unbound generics named in `bindings` and collapses bound generics
/// to their bounds. Unbound generics without a binding are kept.
#[must_use]
pub fn substitute(ty: &Ty, bindings: &Bindings) -> Ty {
    match ty {
        Ty::Class(class) => Ty::class(
            class.name.clone(),
            class.args.iter().map(|arg| substitute(arg, bindings)).collect(),
        ),
        Ty::Generic(Generic {
            bound: Some(bound), ..
        }) => substitute(bound, bindings),
        Ty::Generic(Generic { name, bound: None }) => match bindings.get(name) {
            Some(binding) => binding.clone(),
            None => ty.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(arg: Ty) -> Ty {
        Ty::class("java.util.List", vec![arg])
    }

    #[test]
    fn bare_generic_binds_whole_actual() {
        let pairs = fill(&[Ty::unbound("T")], &[list(Ty::int())]);
        assert_eq!(pairs, vec![(EcoString::from("T"), list(Ty::int()))]);
    }

    #[test]
    fn nested_generic_binds_argument() {
        let pairs = fill(&[list(Ty::unbound("T"))], &[list(Ty::string())]);
        assert_eq!(pairs, vec![(EcoString::from("T"), Ty::string())]);
    }

    #[test]
    fn bound_and_concrete_formals_bind_nothing() {
        assert!(fill(&[Ty::bound("E", Ty::int())], &[Ty::int()]).is_empty());
        assert!(fill(&[Ty::int()], &[Ty::int()]).is_empty());
    }

    #[test]
    fn actual_bound_generics_are_collapsed() {
        let pairs = fill(&[Ty::unbound("T")], &[Ty::bound("E", Ty::string())]);
        assert!(matches!(&pairs[0].1, Ty::Class(class) if class.name == "java.lang.String"));
    }

    #[test]
    fn null_actuals_bind_nothing() {
        assert!(fill(&[Ty::unbound("T")], &[Ty::null()]).is_empty());
        let bindings = bind(
            &[Ty::unbound("T"), Ty::unbound("T")],
            &[Ty::int(), Ty::null()],
        );
        assert_eq!(bindings.get("T"), Some(&Ty::int()));
    }

    #[test]
    fn later_pairs_win_in_bindings() {
        let bindings = bind(
            &[Ty::unbound("T"), Ty::unbound("T")],
            &[Ty::int(), Ty::string()],
        );
        assert_eq!(bindings.get("T"), Some(&Ty::string()));
    }

    #[test]
    fn substitute_replaces_and_collapses() {
        let bindings = bind(&[Ty::unbound("T")], &[Ty::int()]);
        let ty = Ty::class(
            "Pair",
            vec![Ty::unbound("T"), Ty::bound("U", Ty::string())],
        );
        let substituted = substitute(&ty, &bindings);
        assert_eq!(substituted, Ty::class("Pair", vec![Ty::int(), Ty::string()]));
        assert!(substituted.is_concrete());
        assert_eq!(substitute(&Ty::unbound("V"), &bindings), Ty::unbound("V"));
    }
}
