// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error diagnostics using miette.
//!
//! Converts mwj-core errors into miette reports with the offending source
//! line underlined. Programs arrive as ASTs, so source text is only available
//! when the caller has it; without it the reports carry the message alone.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use mwj_core::source_analysis::{SourceLocation, Span};
use mwj_core::{AnalysisError, RuntimeError};

/// A program rejected by the static analyzer.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(mwj::analysis))]
pub struct AnalysisDiagnostic {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl AnalysisDiagnostic {
    #[must_use]
    pub fn new(error: &AnalysisError, source: Option<&str>) -> Self {
        let (src, span) = excerpt(&error.location, source);
        Self {
            message: format!("{}: {}", error.location, error.kind),
            src,
            span,
        }
    }
}

/// A program that failed while running. The message is the full traceback.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{traceback}")]
#[diagnostic(code(mwj::runtime))]
pub struct RuntimeDiagnostic {
    pub traceback: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{label}")]
    pub span: Option<SourceSpan>,
    pub label: String,
}

impl RuntimeDiagnostic {
    #[must_use]
    pub fn new(error: &RuntimeError, source: Option<&str>) -> Self {
        let (src, span) = excerpt(&error.location, source);
        Self {
            traceback: error.traceback(),
            src,
            span,
            label: error.kind.to_string(),
        }
    }
}

fn excerpt(location: &SourceLocation, source: Option<&str>) -> (NamedSource<String>, Option<SourceSpan>) {
    let text = source.unwrap_or_default();
    let span = source.and_then(|text| source_span(location.span, text));
    (
        NamedSource::new(location.source.as_str(), text.to_owned()),
        span,
    )
}

/// Converts a line/column span to the byte range of the character it points at.
#[must_use]
pub fn source_span(span: Span, source: &str) -> Option<SourceSpan> {
    let offset = span.offset_in(source)?;
    let len = source[offset..].chars().next().map_or(0, char::len_utf8);
    Some((offset, len).into())
}
