// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The two [`MemberSource`] views the resolver runs against.

use std::rc::Rc;

use ecow::EcoString;

use super::binder::{Bindings, substitute};
use super::class::Class;
use super::registry::TypeRegistry;
use super::resolver::MemberSource;
use super::table::{ClassTable, MemberTemplate, TypeParams};
use super::ty::{ClassTy, Signature, Ty};
use super::TypeError;
use crate::source_analysis::Span;

/// Declared types, as the analyzer sees them.
///
/// An owner is a class type whose arguments may still mention generic
/// parameters of the code being checked. An owner without arguments is the
/// static view of its class.
#[derive(Debug, Clone, Copy)]
pub struct StaticMembers<'a> {
    table: &'a ClassTable,
}

impl<'a> StaticMembers<'a> {
    #[must_use]
    pub fn new(table: &'a ClassTable) -> Self {
        Self { table }
    }

    /// The owner's generic parameters bound to its arguments.
    fn params(&self, owner: &ClassTy) -> Result<TypeParams, TypeError> {
        let template = self.table.template(&owner.name, Span::default())?;
        Ok(if template.generics.len() == owner.args.len() {
            TypeParams::bound(&template.generics, &owner.args)
        } else {
            TypeParams::unbound(&template.generics)
        })
    }

    fn typed(
        &self,
        owner: &ClassTy,
        members: impl Iterator<Item = Rc<MemberTemplate>>,
    ) -> Result<Vec<(Rc<MemberTemplate>, Rc<Signature>)>, TypeError> {
        let params = self.params(owner)?;
        members
            .map(|member| {
                let signature = Rc::new(self.table.signature(&member, &params)?);
                Ok((member, signature))
            })
            .collect()
    }
}

impl MemberSource for StaticMembers<'_> {
    type Owner = ClassTy;
    type Member = Rc<MemberTemplate>;

    fn table(&self) -> &ClassTable {
        self.table
    }

    fn owner_name(&self, owner: &ClassTy) -> EcoString {
        owner.name.clone()
    }

    fn base(&self, owner: &ClassTy) -> Result<Option<ClassTy>, TypeError> {
        let template = self.table.template(&owner.name, Span::default())?;
        let Some(base) = &template.base else {
            return Ok(None);
        };
        let bindings: Bindings = template
            .generics
            .iter()
            .cloned()
            .zip(owner.args.iter().cloned())
            .collect();
        Ok(match substitute(base, &bindings) {
            Ty::Class(class) => Some(class),
            Ty::Generic(_) => None,
        })
    }

    fn methods(
        &self,
        owner: &ClassTy,
        name: &str,
        is_static: bool,
    ) -> Result<Vec<(Rc<MemberTemplate>, Rc<Signature>)>, TypeError> {
        let template = self.table.template(&owner.name, Span::default())?;
        self.typed(owner, template.methods_named(name, is_static).cloned())
    }

    fn constructors(
        &self,
        owner: &ClassTy,
    ) -> Result<Vec<(Rc<MemberTemplate>, Rc<Signature>)>, TypeError> {
        let template = self.table.template(&owner.name, Span::default())?;
        self.typed(owner, template.constructors.iter().cloned())
    }
}

/// Instantiated runtime classes, as the engine sees them.
///
/// Signatures come from each class's lazily typed members, so repeated calls
/// never re-lower a signature.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeMembers<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> RuntimeMembers<'a> {
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }
}

/// Index of a member in its class's constructor or method list.
pub type MemberIndex = usize;

impl MemberSource for RuntimeMembers<'_> {
    type Owner = Rc<Class>;
    type Member = MemberIndex;

    fn table(&self) -> &ClassTable {
        self.registry.table()
    }

    fn owner_name(&self, owner: &Rc<Class>) -> EcoString {
        owner.name().clone()
    }

    fn base(&self, owner: &Rc<Class>) -> Result<Option<Rc<Class>>, TypeError> {
        Ok(owner.base().cloned())
    }

    fn methods(
        &self,
        owner: &Rc<Class>,
        name: &str,
        is_static: bool,
    ) -> Result<Vec<(MemberIndex, Rc<Signature>)>, TypeError> {
        let table = self.registry.table();
        owner
            .methods
            .iter()
            .enumerate()
            .filter(|(_, member)| {
                member.template().name == name && member.template().is_static == is_static
            })
            .map(|(index, member)| Ok((index, owner.signature(member, table)?)))
            .collect()
    }

    fn constructors(
        &self,
        owner: &Rc<Class>,
    ) -> Result<Vec<(MemberIndex, Rc<Signature>)>, TypeError> {
        let table = self.registry.table();
        owner
            .constructors()
            .iter()
            .enumerate()
            .map(|(index, member)| Ok((index, owner.signature(member, table)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::{class, constructor, method, param};
    use crate::test_helpers::table_for;
    use crate::types::{Resolution, resolve_constructor, resolve_method};

    /// `std::mem::discriminant` cannot compare resolutions whose owner and
    /// member types differ, so compare variant names instead.
    fn variant<O, M>(resolution: &Resolution<O, M>) -> &'static str {
        match resolution {
            Resolution::Found(_) => "Found",
            Resolution::DefaultConstructor => "DefaultConstructor",
            Resolution::Ambiguous(_) => "Ambiguous",
            Resolution::Missing(_) => "Missing",
        }
    }

    fn table() -> ClassTable {
        table_for(vec![
            class("Box")
                .generics(&["T"])
                .field("T", "value")
                .constructor(constructor(vec![param("T", "v")], vec![]))
                .method(method("get", Some("T"), vec![], vec![]))
                .method(method("put", None, vec![param("T", "v")], vec![]))
                .method(
                    method("pick", Some("U"), vec![param("U", "a"), param("T", "b")], vec![])
                        .generics(&["U"]),
                ),
            class("IntBox").extends("Box<int>"),
        ])
        .expect("builds")
    }

    #[test]
    fn static_view_substitutes_class_generics() {
        let table = table();
        let members = StaticMembers::new(&table);
        let owner = ClassTy {
            name: "Box".into(),
            args: vec![Ty::named("java.lang.Integer")],
        };
        let Ok(Resolution::Found(selected)) = resolve_method(&members, &owner, "get", false, &[])
        else {
            panic!("expected get()");
        };
        assert_eq!(
            selected.return_type().map(|ty| ty.resolved()),
            Some(Ty::named("java.lang.Integer"))
        );
    }

    #[test]
    fn static_view_walks_substituted_base() {
        let table = table();
        let members = StaticMembers::new(&table);
        let owner = ClassTy {
            name: "IntBox".into(),
            args: Vec::new(),
        };
        let base = members.base(&owner).expect("base").expect("has base");
        assert_eq!(base.args, vec![Ty::int()]);
        let Ok(Resolution::Found(selected)) = resolve_method(&members, &owner, "get", false, &[])
        else {
            panic!("expected inherited get()");
        };
        assert_eq!(selected.owner.name, "Box");
        assert_eq!(selected.return_type().map(|ty| ty.resolved()), Some(Ty::int()));
    }

    #[test]
    fn runtime_view_agrees_with_static_view() {
        let table = Rc::new(table());
        let registry = TypeRegistry::new(Rc::clone(&table));
        let runtime = RuntimeMembers::new(&registry);
        let declared = StaticMembers::new(&table);
        let boxed = registry
            .class_of(&Ty::class("Box", vec![Ty::string()]), Span::default())
            .expect("instantiates");

        for args in [vec![Ty::string()], vec![Ty::int()], vec![]] {
            let at_runtime = resolve_constructor(&runtime, &boxed, &args).expect("resolves");
            let statically = resolve_constructor(&declared, boxed.ty(), &args).expect("resolves");
            assert_eq!(
                variant(&at_runtime),
                variant(&statically),
                "constructor resolution differs for {args:?}"
            );
        }
    }

    #[test]
    fn runtime_method_resolution_agrees_with_static() {
        let table = Rc::new(table());
        let registry = TypeRegistry::new(Rc::clone(&table));
        let runtime = RuntimeMembers::new(&registry);
        let declared = StaticMembers::new(&table);
        let integer = Ty::named("java.lang.Integer");
        let owners = [
            Ty::class("Box", vec![Ty::string()]),
            Ty::class("Box", vec![Ty::int()]),
            Ty::named("IntBox"),
        ];
        let calls = [
            ("get", vec![]),
            ("get", vec![Ty::int()]),
            ("put", vec![Ty::string()]),
            ("put", vec![Ty::int()]),
            ("put", vec![integer.clone()]),
            ("put", vec![Ty::null()]),
            ("pick", vec![Ty::string(), Ty::int()]),
            ("pick", vec![integer, Ty::string()]),
            ("pick", vec![Ty::null(), Ty::null()]),
            ("size", vec![]),
        ];

        for owner in &owners {
            let class = registry.class_of(owner, Span::default()).expect("instantiates");
            for (name, args) in &calls {
                let at_runtime =
                    resolve_method(&runtime, &class, name, false, args).expect("resolves");
                let statically =
                    resolve_method(&declared, class.ty(), name, false, args).expect("resolves");
                assert_eq!(
                    variant(&at_runtime),
                    variant(&statically),
                    "{owner}.{name} resolution differs for {args:?}"
                );
                if let (Resolution::Found(at_runtime), Resolution::Found(statically)) =
                    (&at_runtime, &statically)
                {
                    assert_eq!(at_runtime.owner.name(), &statically.owner.name);
                    assert_eq!(at_runtime.signature.name, statically.signature.name);
                }
            }
        }

        let int_box = registry.class_of(&owners[2], Span::default()).expect("instantiates");
        let Ok(Resolution::Found(inherited)) = resolve_method(&runtime, &int_box, "get", false, &[])
        else {
            panic!("expected inherited get()");
        };
        assert_eq!(inherited.owner.name(), "Box");
    }

    #[test]
    fn runtime_signatures_are_cached() {
        let table = Rc::new(table());
        let registry = TypeRegistry::new(Rc::clone(&table));
        let boxed = registry
            .class_of(&Ty::class("Box", vec![Ty::int()]), Span::default())
            .expect("instantiates");
        let members = RuntimeMembers::new(&registry);
        let first = members.methods(&boxed, "get", false).expect("typed");
        let second = members.methods(&boxed, "get", false).expect("typed");
        assert!(Rc::ptr_eq(&first[0].1, &second[0].1));
    }
}
