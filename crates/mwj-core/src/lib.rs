// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Middleweight Java (MWJ) language core.
//!
//! This crate contains everything between a parsed program and its execution:
//! - The AST the external parser hands over ([`ast`])
//! - The type model, generic binder and member resolver shared by both
//!   passes ([`types`])
//! - Natively implemented classes and the bundled standard library ([`native`])
//! - The static analyzer ([`semantic_analysis`])
//! - The tree-walking execution engine ([`interpreter`])
//!
//! [`run`] chains analysis and execution the way the command-line driver does.

pub mod ast;
pub mod interpreter;
pub mod native;
pub mod semantic_analysis;
pub mod source_analysis;
pub mod types;

#[cfg(test)]
mod test_helpers;

use miette::Diagnostic;
use thiserror::Error;

pub use interpreter::{Interpreter, RuntimeError, RuntimeErrorKind, interpret};
pub use semantic_analysis::{AnalysisError, AnalysisErrorKind, analyse};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{ClassDecl, Expression, Program, Statement, TypeExpr};
    pub use crate::interpreter::{Interpreter, Value, Variable};
    pub use crate::source_analysis::{SourceLocation, Span};
    pub use crate::types::{ClassTable, Ty};
}

/// Any failure of the analyse-then-execute pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum MwjError {
    /// The program was rejected before execution.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Analysis(#[from] AnalysisError),

    /// The program failed while running.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Analyses `program` and, if it is well-typed, runs its `main` method with the
/// standard library, writing program output to stdout.
///
/// # Errors
///
/// Returns the first analysis error, or the runtime error that aborted execution.
pub fn run(program: &mut ast::Program) -> Result<(), MwjError> {
    analyse(program)?;
    Interpreter::new(program)?.run()?;
    Ok(())
}
