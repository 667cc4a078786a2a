// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Static analysis error types.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::{SourceLocation, Span};
use crate::types::TypeError;

/// Why a program was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AnalysisErrorKind {
    /// A type name or import that denotes nothing.
    #[error("Unknown type '{name}'")]
    #[diagnostic(code(mwj::analysis::unknown_type))]
    UnknownType { name: EcoString },

    /// Any other rule violation.
    #[error("{message}")]
    #[diagnostic(code(mwj::analysis::sanity))]
    Sanity { message: String },
}

/// The first problem analysis found, with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(forward(kind))]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub location: SourceLocation,
}

impl AnalysisError {
    #[must_use]
    pub fn new(kind: AnalysisErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    /// A [`AnalysisErrorKind::Sanity`] error.
    #[must_use]
    pub fn sanity(message: impl Into<String>, source: &EcoString, span: Span) -> Self {
        Self::new(
            AnalysisErrorKind::Sanity {
                message: message.into(),
            },
            SourceLocation::new(source.clone(), span),
        )
    }

    /// Reports a type-model failure: unknown names keep their kind,
    /// everything else is a sanity error.
    #[must_use]
    pub fn from_type(error: &TypeError, source: &EcoString) -> Self {
        let location = SourceLocation::new(source.clone(), error.span());
        let kind = match error {
            TypeError::UnknownType { name, .. } => AnalysisErrorKind::UnknownType { name: name.clone() },
            other => AnalysisErrorKind::Sanity {
                message: other.to_string(),
            },
        };
        Self::new(kind, location)
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.location.span
    }
}
