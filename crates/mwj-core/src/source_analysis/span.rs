// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Line/column spans and located positions.

use std::fmt;

use ecow::EcoString;
use serde::{Deserialize, Serialize};

/// A position in source code, as reported by the parser.
///
/// Lines and columns are 1-based. The default span (`0:0`) marks nodes that
/// were synthesized rather than parsed.
///
/// # Examples
///
/// ```
/// use mwj_core::source_analysis::Span;
///
/// let span = Span::new(3, 9);
/// assert_eq!(span.line(), 3);
/// assert_eq!(span.column(), 9);
/// assert!(!span.is_synthetic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    line: u32,
    column: u32,
}

impl Span {
    /// Creates a span at a 1-based line and column.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the 1-based line.
    #[must_use]
    pub const fn line(self) -> u32 {
        self.line
    }

    /// Returns the 1-based column.
    #[must_use]
    pub const fn column(self) -> u32 {
        self.column
    }

    /// Returns true for spans of nodes that never appeared in source.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.line == 0
    }

    /// Converts to a byte offset into `source`.
    ///
    /// Columns count characters, so multi-byte text before the position is
    /// accounted for. Returns `None` when the position lies outside `source`.
    #[must_use]
    pub fn offset_in(self, source: &str) -> Option<usize> {
        if self.is_synthetic() {
            return None;
        }
        let mut line_start = 0;
        for _ in 1..self.line {
            line_start += source[line_start..].find('\n')? + 1;
        }
        let line = source[line_start..].split('\n').next().unwrap_or_default();
        let column = self.column.max(1) as usize - 1;
        if column == 0 {
            return Some(line_start);
        }
        line.char_indices()
            .nth(column)
            .map(|(offset, _)| line_start + offset)
            .or_else(|| (line.chars().count() == column).then_some(line_start + line.len()))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span qualified by the name of the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub source: EcoString,
    pub span: Span,
}

impl SourceLocation {
    #[must_use]
    pub fn new(source: impl Into<EcoString>, span: Span) -> Self {
        Self {
            source: source.into(),
            span,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.span)
    }
}
