// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Class declarations of a program and the lowering of written types.
//!
//! A [`ClassTemplate`] is a class before instantiation: its generic parameter
//! names, its base and fields typed in terms of those parameters, and its
//! members with their written signatures. Source-declared, native and
//! primitive classes all become templates in one [`ClassTable`], so nothing
//! downstream can tell them apart.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use ecow::EcoString;
use tracing::debug;

use super::imports::ImportTable;
use super::ty::{BOOLEAN, FLOAT, INT, OBJECT, Param, Signature, Ty};
use super::TypeError;
use crate::ast::{ClassDecl, Expression, Program, Statement, TypeExpr};
use crate::native::{NativeClass, NativeFn, NativeMember, NativeRegistry};
use crate::source_analysis::Span;

/// The built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    Boolean,
}

impl Primitive {
    pub const ALL: [Self; 3] = [Self::Int, Self::Float, Self::Boolean];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            INT => Some(Self::Int),
            FLOAT => Some(Self::Float),
            BOOLEAN => Some(Self::Boolean),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => INT,
            Self::Float => FLOAT,
            Self::Boolean => BOOLEAN,
        }
    }

    /// The `java.lang` class a value of this type boxes to.
    #[must_use]
    pub const fn boxed(self) -> &'static str {
        match self {
            Self::Int => "java.lang.Integer",
            Self::Float => "java.lang.Float",
            Self::Boolean => "java.lang.Boolean",
        }
    }
}

/// Where a class was declared.
#[derive(Debug, Clone)]
pub enum ClassOrigin {
    Declared,
    Native(Rc<NativeClass>),
    Primitive(Primitive),
}

/// A field with its type in terms of the class's own generic parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    pub name: EcoString,
    pub ty: Ty,
    pub span: Span,
}

/// What runs when a member is invoked.
#[derive(Debug, Clone)]
pub enum MemberBody {
    Declared {
        body: Rc<[Statement]>,
        /// Arguments of a leading `super(...)`; constructors only.
        super_arguments: Option<Rc<[Expression]>>,
    },
    Native(NativeFn),
}

/// A method or constructor with its signature as written.
///
/// Written types are lowered on demand by [`ClassTable::signature`], which
/// lets declarations refer to classes declared later in the program.
#[derive(Debug, Clone)]
pub struct MemberTemplate {
    /// Fully-qualified name of the declaring class.
    pub owner: EcoString,
    /// Method name, or the class's simple name for constructors.
    pub name: EcoString,
    pub is_static: bool,
    pub is_constructor: bool,
    pub generics: Vec<EcoString>,
    pub params: Vec<(EcoString, TypeExpr)>,
    pub return_type: Option<TypeExpr>,
    pub body: MemberBody,
    pub span: Span,
}

impl MemberTemplate {
    fn from_native(owner: &EcoString, member: &NativeMember) -> Self {
        Self {
            owner: owner.clone(),
            name: member.name.clone(),
            is_static: member.is_static,
            is_constructor: member.is_constructor,
            generics: member.generics.clone(),
            params: member
                .params
                .iter()
                .map(|(ty, name)| (name.clone(), ty.clone()))
                .collect(),
            return_type: member.return_type.clone(),
            body: MemberBody::Native(member.function),
            span: Span::default(),
        }
    }
}

/// A class before instantiation.
#[derive(Debug, Clone)]
pub struct ClassTemplate {
    /// Fully-qualified name.
    pub name: EcoString,
    pub generics: Vec<EcoString>,
    /// `None` only for `java.lang.Object`.
    pub base: Option<Ty>,
    pub fields: Vec<FieldTemplate>,
    pub constructors: Vec<Rc<MemberTemplate>>,
    pub methods: Vec<Rc<MemberTemplate>>,
    pub origin: ClassOrigin,
    pub span: Span,
}

impl ClassTemplate {
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        match self.origin {
            ClassOrigin::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    #[must_use]
    pub fn native(&self) -> Option<&Rc<NativeClass>> {
        match &self.origin {
            ClassOrigin::Native(native) => Some(native),
            _ => None,
        }
    }

    /// Methods declared directly on this class with the given name and static-ness.
    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
        is_static: bool,
    ) -> impl Iterator<Item = &'a Rc<MemberTemplate>> + 'a {
        self.methods
            .iter()
            .filter(move |method| method.name == name && method.is_static == is_static)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldTemplate> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Generic parameters visible while lowering a written type.
///
/// Later entries shadow earlier ones, so method generics pushed after class
/// generics win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeParams {
    entries: Vec<(EcoString, Ty)>,
}

impl TypeParams {
    /// Every name maps to an unbound generic of the same name.
    pub fn unbound<'a>(names: impl IntoIterator<Item = &'a EcoString>) -> Self {
        let mut params = Self::default();
        params.push_unbound(names);
        params
    }

    /// Pairs parameter names with arguments as bound generics.
    #[must_use]
    pub fn bound(names: &[EcoString], args: &[Ty]) -> Self {
        Self {
            entries: names
                .iter()
                .zip(args)
                .map(|(name, arg)| (name.clone(), Ty::bound(name.clone(), arg.clone())))
                .collect(),
        }
    }

    pub fn push_unbound<'a>(&mut self, names: impl IntoIterator<Item = &'a EcoString>) {
        for name in names {
            self.entries.push((name.clone(), Ty::unbound(name.clone())));
        }
    }

    pub fn push(&mut self, name: EcoString, ty: Ty) {
        self.entries.push((name, ty));
    }

    /// Appends `other`'s entries, which then shadow ours.
    pub fn extend(&mut self, other: &Self) {
        self.entries.extend(other.entries.iter().cloned());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.entries
            .iter()
            .rev()
            .find(|(entry, _)| entry == name)
            .map(|(_, ty)| ty)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every class a program can name, plus cached ancestor chains.
#[derive(Debug)]
pub struct ClassTable {
    classes: HashMap<EcoString, Rc<ClassTemplate>>,
    imports: ImportTable,
    natives: Rc<NativeRegistry>,
    ancestors: RefCell<HashMap<EcoString, Rc<[EcoString]>>>,
}

impl ClassTable {
    /// Collects the templates of `program`, the native classes and the primitives.
    ///
    /// # Errors
    ///
    /// Fails on unknown imports, duplicate class names, unknown or misapplied
    /// types in `extends` clauses and field declarations, classes extending a
    /// generic parameter, and inheritance cycles.
    #[tracing::instrument(skip_all, fields(source = %program.source))]
    pub fn build(program: &Program, natives: Rc<NativeRegistry>) -> Result<Self, TypeError> {
        let imports = ImportTable::build(program, &natives)?;

        let mut arity: HashMap<EcoString, usize> = HashMap::new();
        for primitive in Primitive::ALL {
            arity.insert(primitive.name().into(), 0);
        }
        for native in natives.classes() {
            arity.insert(native.fqn().clone(), native.generics().len());
        }
        let mut seen = HashSet::new();
        for decl in &program.classes {
            let name = &decl.name.name;
            if arity.contains_key(name) || !seen.insert(name.clone()) {
                return Err(TypeError::DuplicateClass {
                    name: name.clone(),
                    span: decl.name.span,
                });
            }
            arity.insert(name.clone(), decl.generics.len());
        }
        let arity_of = |name: &str| arity.get(name).copied();

        let mut classes = HashMap::new();
        for primitive in Primitive::ALL {
            let name = EcoString::from(primitive.name());
            classes.insert(
                name.clone(),
                Rc::new(ClassTemplate {
                    name,
                    generics: Vec::new(),
                    base: Some(Ty::object()),
                    fields: Vec::new(),
                    constructors: Vec::new(),
                    methods: Vec::new(),
                    origin: ClassOrigin::Primitive(primitive),
                    span: Span::default(),
                }),
            );
        }
        for native in natives.classes() {
            let template = native_template(native, &imports, &arity_of)?;
            classes.insert(template.name.clone(), Rc::new(template));
        }
        for decl in &program.classes {
            let template = declared_template(decl, &imports, &arity_of)?;
            classes.insert(template.name.clone(), Rc::new(template));
        }

        let table = Self {
            classes,
            imports,
            natives,
            ancestors: RefCell::new(HashMap::new()),
        };
        for decl in &program.classes {
            table.check_acyclic(&decl.name.name, decl.name.span)?;
        }
        debug!(classes = table.classes.len(), "class table built");
        Ok(table)
    }

    fn check_acyclic(&self, name: &EcoString, span: Span) -> Result<(), TypeError> {
        let mut visited = HashSet::new();
        let mut current = Some(name.clone());
        while let Some(class) = current {
            if !visited.insert(class.clone()) {
                return Err(TypeError::InheritanceCycle {
                    name: name.clone(),
                    span,
                });
            }
            current = self
                .classes
                .get(&class)
                .and_then(|template| template.base.as_ref())
                .map(|base| base.name().clone());
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<ClassTemplate>> {
        self.classes.get(name)
    }

    /// Looks up a template by fully-qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownType`] when no such class exists.
    pub fn template(&self, name: &str, span: Span) -> Result<&Rc<ClassTemplate>, TypeError> {
        self.classes
            .get(name)
            .ok_or_else(|| TypeError::unknown(name, span))
    }

    #[must_use]
    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    #[must_use]
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Declared class names in no particular order.
    pub fn class_names(&self) -> impl Iterator<Item = &EcoString> {
        self.classes.keys()
    }

    /// Lowers a written type with the given generic parameters in scope.
    ///
    /// # Errors
    ///
    /// Fails on unknown names and on generic argument count mismatches.
    pub fn lower(&self, expr: &TypeExpr, params: &TypeParams) -> Result<Ty, TypeError> {
        lower_type(expr, params, &self.imports, &|name| {
            self.classes.get(name).map(|template| template.generics.len())
        })
    }

    /// Types a member's written signature.
    ///
    /// Instance members see `class_params`; static members see only their
    /// own generic parameters.
    ///
    /// # Errors
    ///
    /// Propagates lowering failures of parameter and return types.
    pub fn signature(
        &self,
        member: &MemberTemplate,
        class_params: &TypeParams,
    ) -> Result<Signature, TypeError> {
        let mut params = if member.is_static {
            TypeParams::default()
        } else {
            class_params.clone()
        };
        params.push_unbound(&member.generics);
        let typed = member
            .params
            .iter()
            .map(|(name, ty)| {
                Ok(Param {
                    name: name.clone(),
                    ty: self.lower(ty, &params)?,
                })
            })
            .collect::<Result<Vec<_>, TypeError>>()?;
        let return_type = member
            .return_type
            .as_ref()
            .map(|ty| self.lower(ty, &params))
            .transpose()?;
        Ok(Signature {
            name: member.name.clone(),
            is_static: member.is_static,
            generics: member.generics.clone(),
            params: typed,
            return_type,
        })
    }

    /// The chain of class names from `name` up to `java.lang.Object`.
    ///
    /// Computed once per name. A name with no template has the one-element
    /// chain `[name]`.
    pub fn ancestors(&self, name: &str) -> Rc<[EcoString]> {
        if let Some(chain) = self.ancestors.borrow().get(name) {
            return Rc::clone(chain);
        }
        let mut chain: Vec<EcoString> = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(EcoString::from(name));
        while let Some(class) = current {
            if !visited.insert(class.clone()) {
                break;
            }
            current = self
                .classes
                .get(&class)
                .and_then(|template| template.base.as_ref())
                .map(|base| base.name().clone());
            chain.push(class);
        }
        let chain: Rc<[EcoString]> = chain.into();
        self.ancestors
            .borrow_mut()
            .insert(EcoString::from(name), Rc::clone(&chain));
        chain
    }

    /// Returns true when `ancestor` is `class` or one of its ancestors.
    #[must_use]
    pub fn inherits(&self, class: &str, ancestor: &str) -> bool {
        self.ancestors(class).iter().any(|name| name == ancestor)
    }
}

pub(super) fn lower_type(
    expr: &TypeExpr,
    params: &TypeParams,
    imports: &ImportTable,
    arity: &dyn Fn(&str) -> Option<usize>,
) -> Result<Ty, TypeError> {
    if let Some(ty) = params.get(&expr.name) {
        if !expr.generics.is_empty() {
            return Err(TypeError::GenericArity {
                name: expr.name.clone(),
                expected: 0,
                given: expr.generics.len(),
                span: expr.span,
            });
        }
        return Ok(ty.clone());
    }
    let name = imports
        .resolve(&expr.name)
        .ok_or_else(|| TypeError::unknown(expr.name.clone(), expr.span))?;
    let expected = arity(name).ok_or_else(|| TypeError::unknown(expr.name.clone(), expr.span))?;
    if expected != expr.generics.len() {
        return Err(TypeError::GenericArity {
            name: name.clone(),
            expected,
            given: expr.generics.len(),
            span: expr.span,
        });
    }
    let args = expr
        .generics
        .iter()
        .map(|arg| lower_type(arg, params, imports, arity))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ty::class(name.clone(), args))
}

fn lower_base(
    class: &EcoString,
    base: Option<&TypeExpr>,
    params: &TypeParams,
    imports: &ImportTable,
    arity: &dyn Fn(&str) -> Option<usize>,
) -> Result<Option<Ty>, TypeError> {
    let Some(base) = base else {
        return Ok((class != OBJECT).then(Ty::object));
    };
    if params.get(&base.name).is_some() {
        return Err(TypeError::GenericBase {
            class: class.clone(),
            base: base.name.clone(),
            span: base.span,
        });
    }
    lower_type(base, params, imports, arity).map(Some)
}

fn native_template(
    native: &Rc<NativeClass>,
    imports: &ImportTable,
    arity: &dyn Fn(&str) -> Option<usize>,
) -> Result<ClassTemplate, TypeError> {
    let name = native.fqn().clone();
    let params = TypeParams::unbound(native.generics());
    let base = lower_base(&name, native.base(), &params, imports, arity)?;
    Ok(ClassTemplate {
        generics: native.generics().to_vec(),
        base,
        fields: Vec::new(),
        constructors: native
            .constructors()
            .iter()
            .map(|member| Rc::new(MemberTemplate::from_native(&name, member)))
            .collect(),
        methods: native
            .methods()
            .iter()
            .map(|member| Rc::new(MemberTemplate::from_native(&name, member)))
            .collect(),
        origin: ClassOrigin::Native(Rc::clone(native)),
        span: Span::default(),
        name,
    })
}

fn declared_template(
    decl: &ClassDecl,
    imports: &ImportTable,
    arity: &dyn Fn(&str) -> Option<usize>,
) -> Result<ClassTemplate, TypeError> {
    let name = decl.name.name.clone();
    let generics: Vec<EcoString> = decl.generics.iter().map(|g| g.name.clone()).collect();
    let params = TypeParams::unbound(&generics);
    let base = lower_base(&name, decl.base.as_ref(), &params, imports, arity)?;
    let fields = decl
        .fields
        .iter()
        .map(|field| {
            Ok(FieldTemplate {
                name: field.name.name.clone(),
                ty: lower_type(&field.ty, &params, imports, arity)?,
                span: field.span,
            })
        })
        .collect::<Result<Vec<_>, TypeError>>()?;
    let constructors = decl
        .constructors
        .iter()
        .map(|ctor| {
            Rc::new(MemberTemplate {
                owner: name.clone(),
                name: name.clone(),
                is_static: false,
                is_constructor: true,
                generics: Vec::new(),
                params: ctor
                    .parameters
                    .iter()
                    .map(|p| (p.name.name.clone(), p.ty.clone()))
                    .collect(),
                return_type: None,
                body: MemberBody::Declared {
                    body: ctor.body.clone().into(),
                    super_arguments: ctor.super_arguments.clone().map(Into::into),
                },
                span: ctor.span,
            })
        })
        .collect();
    let methods = decl
        .methods
        .iter()
        .map(|method| {
            Rc::new(MemberTemplate {
                owner: name.clone(),
                name: method.name.name.clone(),
                is_static: method.is_static,
                is_constructor: false,
                generics: method.generics.iter().map(|g| g.name.clone()).collect(),
                params: method
                    .parameters
                    .iter()
                    .map(|p| (p.name.name.clone(), p.ty.clone()))
                    .collect(),
                return_type: method.return_type.clone(),
                body: MemberBody::Declared {
                    body: method.body.clone().into(),
                    super_arguments: None,
                },
                span: method.span,
            })
        })
        .collect();
    Ok(ClassTemplate {
        name,
        generics,
        base,
        fields,
        constructors,
        methods,
        origin: ClassOrigin::Declared,
        span: decl.span,
    })
}
