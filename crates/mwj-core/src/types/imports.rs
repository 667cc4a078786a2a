// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The name → fully-qualified-name table of a program.

use std::collections::HashMap;

use ecow::EcoString;

use super::TypeError;
use super::ty::{BOOLEAN, FLOAT, INT};
use crate::ast::Program;
use crate::native::{NamespaceEntry, NativeRegistry};

/// Spellings accepted for the primitive types.
const PRIMITIVE_ALIASES: &[(&str, &str)] = &[
    (INT, INT),
    ("byte", INT),
    ("short", INT),
    ("long", INT),
    (FLOAT, FLOAT),
    ("double", FLOAT),
    (BOOLEAN, BOOLEAN),
];

/// Namespace whose classes are visible without an import.
const IMPLICIT_NAMESPACE: &str = "java.lang";

/// Maps every type name a program may write to the class it denotes.
///
/// Later sources override earlier ones: primitives, the implicit `java.lang`
/// namespace, the program's imports, the program's own classes, and finally
/// the fully-qualified name of every native class.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    names: HashMap<EcoString, EcoString>,
}

impl ImportTable {
    /// Builds the table for `program`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownType`] for an import naming nothing.
    pub fn build(program: &Program, natives: &NativeRegistry) -> Result<Self, TypeError> {
        let mut names = HashMap::new();
        for (alias, name) in PRIMITIVE_ALIASES {
            names.insert(EcoString::from(*alias), EcoString::from(*name));
        }
        if let Some(namespace) = natives.namespace(IMPLICIT_NAMESPACE) {
            for class in namespace.classes() {
                names.insert(class.name().clone(), class.fqn().clone());
            }
        }
        for import in &program.imports {
            let dotted = import.dotted();
            match natives.lookup(&dotted) {
                Some(NamespaceEntry::Namespace(namespace)) if import.wildcard => {
                    for class in namespace.classes() {
                        names.insert(class.name().clone(), class.fqn().clone());
                    }
                }
                Some(NamespaceEntry::Class(class)) if !import.wildcard => {
                    names.insert(class.name().clone(), class.fqn().clone());
                }
                _ => return Err(TypeError::unknown(dotted, import.span)),
            }
        }
        for class in &program.classes {
            names.insert(class.name.name.clone(), class.name.name.clone());
        }
        for class in natives.classes() {
            names.insert(class.fqn().clone(), class.fqn().clone());
        }
        Ok(Self { names })
    }

    /// The fully-qualified name `name` denotes, if any.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&EcoString> {
        self.names.get(name)
    }
}
