// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Static analysis for Middleweight Java.
//!
//! Analysis runs ahead of execution and rejects ill-typed programs. It runs in
//! this order and stops at the first error:
//! - Class table construction (duplicate classes, inheritance cycles, bases
//!   that are generic parameters, unknown imports)
//! - Name expansion to fully-qualified names (via `name_resolver`)
//! - Operator precedence restructuring (via [`precedence`])
//! - Main-method and field sanity checks
//! - Per-member type checking (via `type_checker`)
//!
//! Name expansion and precedence restructuring rewrite the program in place;
//! the engine relies on both having run.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::ast::Program;
use crate::native::NativeRegistry;
use crate::source_analysis::Span;
use crate::types::ClassTable;

pub mod error;
mod name_resolver;
pub mod precedence;
mod scope;
mod type_checker;

#[cfg(test)]
mod property_tests;

pub use error::{AnalysisError, AnalysisErrorKind};
pub use name_resolver::NameResolver;
pub use precedence::reorder_operators;
pub use type_checker::TypeChecker;

/// Analyses `program` against the bundled standard library.
///
/// # Errors
///
/// Returns the first error found.
pub fn analyse(program: &mut Program) -> Result<(), AnalysisError> {
    analyse_with(program, Rc::new(NativeRegistry::standard()))
}

/// Analyses `program` against the given native classes.
///
/// # Errors
///
/// Returns the first error found.
#[instrument(skip_all, fields(source = %program.source))]
pub fn analyse_with(program: &mut Program, natives: Rc<NativeRegistry>) -> Result<(), AnalysisError> {
    let source = program.source.clone();
    let table = ClassTable::build(program, natives)
        .map_err(|error| AnalysisError::from_type(&error, &source))?;

    NameResolver::new(&table, &source).resolve_program(program)?;
    reorder_operators(program);
    check_main(program)?;
    check_fields(program)?;
    TypeChecker::new(&table, &source).check_program(program)?;

    debug!(classes = program.classes.len(), "analysis complete");
    Ok(())
}

/// Exactly one `static void main()` must exist across all classes.
fn check_main(program: &Program) -> Result<(), AnalysisError> {
    let mut mains = program.classes.iter().flat_map(|class| {
        class.methods.iter().filter(|method| {
            method.name.name == "main"
                && method.is_static
                && method.parameters.is_empty()
                && method.return_type.is_none()
        })
    });
    if mains.next().is_none() {
        return Err(AnalysisError::sanity(
            "No `static void main()` method found.",
            &program.source,
            Span::default(),
        ));
    }
    if let Some(duplicate) = mains.next() {
        return Err(AnalysisError::sanity(
            "Multiple main() methods defined.",
            &program.source,
            duplicate.span,
        ));
    }
    Ok(())
}

fn check_fields(program: &Program) -> Result<(), AnalysisError> {
    for class in &program.classes {
        let mut seen = HashSet::new();
        for field in &class.fields {
            if !seen.insert(&field.name.name) {
                return Err(AnalysisError::sanity(
                    format!(
                        "Field '{}' already declared in '{}'.",
                        field.name.name, class.name.name
                    ),
                    &program.source,
                    field.name.span,
                ));
            }
        }
    }
    Ok(())
}
