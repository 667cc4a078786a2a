// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The subtype relation.

use super::table::{ClassTable, Primitive};
use super::ty::{Generic, NULL, OBJECT, Ty};

/// Returns true when a value of type `candidate` may be used where `target`
/// is expected.
///
/// An unbound generic target accepts anything; a bound generic target
/// behaves as its bound. Otherwise `candidate`'s ancestor chain must contain
/// the target class (or the two must be a primitive and its box) and the
/// generic arguments must match pairwise by position. Arguments are not
/// re-substituted across inheritance levels, so `TestList<String>` is checked
/// against `List<String>` by comparing `String` with `String` directly.
///
/// The null type passes every class target except the primitives.
#[must_use]
pub fn check(table: &ClassTable, candidate: &Ty, target: &Ty) -> bool {
    let target = match target {
        Ty::Generic(Generic { bound: None, .. }) => return true,
        Ty::Generic(Generic {
            bound: Some(bound), ..
        }) => return check(table, candidate, bound),
        Ty::Class(target) => target,
    };
    match candidate {
        Ty::Generic(Generic {
            bound: Some(bound), ..
        }) => check(table, bound, &Ty::Class(target.clone())),
        // A type parameter is only known to be an Object.
        Ty::Generic(Generic { bound: None, .. }) => target.name == OBJECT,
        Ty::Class(candidate) if candidate.name == NULL => {
            Primitive::from_name(&target.name).is_none()
        }
        Ty::Class(candidate) => {
            let related = table.inherits(&candidate.name, &target.name)
                || boxes(&candidate.name, &target.name);
            related
                && candidate
                    .args
                    .iter()
                    .zip(&target.args)
                    .all(|(candidate, target)| check(table, candidate, target))
        }
    }
}

/// A primitive and its box class are interchangeable.
fn boxes(a: &str, b: &str) -> bool {
    let boxed = |primitive: &str, class: &str| {
        Primitive::from_name(primitive).is_some_and(|p| p.boxed() == class)
    };
    boxed(a, b) || boxed(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::class;
    use crate::test_helpers::table_for;

    fn table() -> ClassTable {
        table_for(vec![
            class("Animal"),
            class("Dog").extends("Animal"),
            class("TestList").generics(&["F"]).extends("java.util.List<F>"),
        ])
        .expect("builds")
    }

    #[test]
    fn classes_accept_themselves_and_subclasses() {
        let table = table();
        assert!(check(&table, &Ty::named("Dog"), &Ty::named("Animal")));
        assert!(check(&table, &Ty::named("Dog"), &Ty::object()));
        assert!(!check(&table, &Ty::named("Animal"), &Ty::named("Dog")));
        assert!(check(&table, &Ty::int(), &Ty::int()));
        assert!(!check(&table, &Ty::int(), &Ty::float()));
    }

    #[test]
    fn unbound_target_accepts_anything() {
        let table = table();
        assert!(check(&table, &Ty::int(), &Ty::unbound("T")));
        assert!(check(&table, &Ty::unbound("U"), &Ty::unbound("T")));
    }

    #[test]
    fn bound_generics_behave_as_their_bound() {
        let table = table();
        assert!(check(&table, &Ty::int(), &Ty::bound("T", Ty::int())));
        assert!(!check(&table, &Ty::string(), &Ty::bound("T", Ty::int())));
        assert!(check(&table, &Ty::bound("T", Ty::named("Dog")), &Ty::named("Animal")));
    }

    #[test]
    fn unbound_candidate_is_an_object() {
        let table = table();
        assert!(check(&table, &Ty::unbound("T"), &Ty::object()));
        assert!(!check(&table, &Ty::unbound("T"), &Ty::string()));
    }

    #[test]
    fn generic_arguments_compare_pairwise() {
        let table = table();
        let ints = Ty::class("java.util.List", vec![Ty::int()]);
        let strings = Ty::class("java.util.List", vec![Ty::string()]);
        assert!(check(&table, &ints, &ints));
        assert!(!check(&table, &ints, &strings));
        let test_list = Ty::class("TestList", vec![Ty::string()]);
        assert!(check(&table, &test_list, &strings));
        assert!(check(&table, &test_list, &Ty::object()));
    }

    #[test]
    fn primitives_box_both_ways() {
        let table = table();
        let integer = Ty::named("java.lang.Integer");
        assert!(check(&table, &Ty::int(), &integer));
        assert!(check(&table, &integer, &Ty::int()));
        assert!(!check(&table, &Ty::float(), &integer));
        assert!(check(&table, &Ty::boolean(), &Ty::named("java.lang.Boolean")));
    }

    #[test]
    fn null_passes_class_targets_only() {
        let table = table();
        assert!(check(&table, &Ty::null(), &Ty::string()));
        assert!(check(&table, &Ty::null(), &Ty::named("Dog")));
        assert!(check(&table, &Ty::null(), &Ty::class("TestList", vec![Ty::int()])));
        assert!(check(&table, &Ty::null(), &Ty::unbound("T")));
        assert!(check(&table, &Ty::null(), &Ty::bound("T", Ty::named("Animal"))));
        assert!(!check(&table, &Ty::null(), &Ty::int()));
        assert!(!check(&table, &Ty::null(), &Ty::bound("T", Ty::boolean())));
        assert!(!check(&table, &Ty::string(), &Ty::null()));
    }
}
