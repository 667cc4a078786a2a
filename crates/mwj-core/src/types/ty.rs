// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type values shared by the analyzer and the engine.

use std::fmt;
use std::hash::{Hash, Hasher};

use ecow::EcoString;

/// Fully-qualified name of the root class.
pub const OBJECT: &str = "java.lang.Object";
/// Fully-qualified name of the string class.
pub const STRING: &str = "java.lang.String";
pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const BOOLEAN: &str = "boolean";
/// The type of a `null` literal argument. It is never instantiated.
pub const NULL: &str = "null";

/// A resolved type: a class applied to generic arguments, or a generic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Class(ClassTy),
    Generic(Generic),
}

/// A class name with its generic arguments, e.g. `java.util.List<int>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTy {
    pub name: EcoString,
    pub args: Vec<Ty>,
}

/// A type parameter, optionally bound to a concrete type.
///
/// Two generics are the same parameter when their names match; the bound does
/// not take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Generic {
    pub name: EcoString,
    pub bound: Option<Box<Ty>>,
}

impl PartialEq for Generic {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Generic {}

impl Hash for Generic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ty {
    #[must_use]
    pub fn class(name: impl Into<EcoString>, args: Vec<Ty>) -> Self {
        Self::Class(ClassTy {
            name: name.into(),
            args,
        })
    }

    /// A class type without generic arguments.
    #[must_use]
    pub fn named(name: impl Into<EcoString>) -> Self {
        Self::class(name, Vec::new())
    }

    #[must_use]
    pub fn unbound(name: impl Into<EcoString>) -> Self {
        Self::Generic(Generic {
            name: name.into(),
            bound: None,
        })
    }

    #[must_use]
    pub fn bound(name: impl Into<EcoString>, bound: Ty) -> Self {
        Self::Generic(Generic {
            name: name.into(),
            bound: Some(Box::new(bound)),
        })
    }

    #[must_use]
    pub fn object() -> Self {
        Self::named(OBJECT)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::named(STRING)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::named(INT)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::named(FLOAT)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::named(BOOLEAN)
    }

    #[must_use]
    pub fn null() -> Self {
        Self::named(NULL)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.is_class(NULL)
    }

    /// The class or parameter name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        match self {
            Self::Class(class) => &class.name,
            Self::Generic(generic) => &generic.name,
        }
    }

    #[must_use]
    pub fn is_unbound_generic(&self) -> bool {
        matches!(self, Self::Generic(Generic { bound: None, .. }))
    }

    /// Returns true when this is the named class, ignoring generic arguments.
    #[must_use]
    pub fn is_class(&self, name: &str) -> bool {
        matches!(self, Self::Class(class) if class.name == name)
    }

    /// Collapses every bound generic to its bound, recursively.
    ///
    /// Unbound generics are kept, so the result may still mention parameters.
    #[must_use]
    pub fn resolved(&self) -> Ty {
        match self {
            Self::Class(class) => Self::Class(ClassTy {
                name: class.name.clone(),
                args: class.args.iter().map(Ty::resolved).collect(),
            }),
            Self::Generic(Generic {
                bound: Some(bound), ..
            }) => bound.resolved(),
            Self::Generic(_) => self.clone(),
        }
    }

    /// Returns true when no unbound generic occurs anywhere in this type.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.first_unbound().is_none()
    }

    /// The first unbound generic parameter occurring in this type.
    #[must_use]
    pub fn first_unbound(&self) -> Option<&EcoString> {
        match self {
            Self::Class(class) => class.args.iter().find_map(Ty::first_unbound),
            Self::Generic(Generic {
                bound: Some(bound), ..
            }) => bound.first_unbound(),
            Self::Generic(generic) => Some(&generic.name),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "{class}"),
            Self::Generic(Generic {
                bound: Some(bound), ..
            }) => write!(f, "{bound}"),
            Self::Generic(generic) => f.write_str(&generic.name),
        }
    }
}

impl fmt::Display for ClassTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Writes `a; b; c` the way argument lists appear in diagnostics.
pub(crate) struct TypeList<'a>(pub &'a [Ty]);

impl fmt::Display for TypeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

/// A typed formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: EcoString,
    pub ty: Ty,
}

/// The typed view of a method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Method name, or the class name for constructors.
    pub name: EcoString,
    pub is_static: bool,
    /// Method-level generic parameter names.
    pub generics: Vec<EcoString>,
    pub params: Vec<Param>,
    /// `None` for `void` and for constructors.
    pub return_type: Option<Ty>,
}

impl Signature {
    #[must_use]
    pub fn param_types(&self) -> Vec<Ty> {
        self.params.iter().map(|param| param.ty.clone()).collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", param.ty, param.name)?;
        }
        f.write_str(")")
    }
}
