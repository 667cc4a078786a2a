// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runtime errors.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::fmt::Write as _;

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::stack::Frame;
use crate::source_analysis::SourceLocation;
use crate::types::{Ambiguity, Missing, TypeError};

/// What went wrong while running a program.
///
/// Only [`AmbiguousMember`](Self::AmbiguousMember),
/// [`NoSuchMember`](Self::NoSuchMember) and
/// [`NullDereference`](Self::NullDereference) can occur in a program that
/// passed analysis.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RuntimeErrorKind {
    #[error("{0}")]
    #[diagnostic(code(mwj::runtime::ambiguous_member))]
    AmbiguousMember(Ambiguity),

    #[error("{0}")]
    #[diagnostic(code(mwj::runtime::no_such_member))]
    NoSuchMember(Missing),

    #[error("Null dereference accessing '{member}'")]
    #[diagnostic(code(mwj::runtime::null_dereference))]
    NullDereference { member: EcoString },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Type(#[from] TypeError),

    #[error("Undefined variable '{name}'")]
    #[diagnostic(code(mwj::runtime::undefined_variable))]
    UndefinedVariable { name: EcoString },

    #[error("{message}")]
    #[diagnostic(code(mwj::runtime::invalid_operation))]
    InvalidOperation { message: String },
}

/// A runtime failure with the location it happened at and the call stack at
/// that moment, innermost frame last.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(forward(kind))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub location: SourceLocation,
    pub stack: Vec<Frame>,
}

impl RuntimeError {
    /// Renders the stack the way it is reported to users:
    ///
    /// ```text
    /// Traceback (most recent call last):
    ///   Main.java:1:1, in Global
    ///   Main.java:3:9, in Main.main()
    /// Main.java:7:13: Null dereference accessing 'length'
    /// ```
    #[must_use]
    pub fn traceback(&self) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        for frame in &self.stack {
            let _ = writeln!(out, "  {}, in {}", frame.location, frame.description);
        }
        let _ = write!(out, "{}: {}", self.location, self.kind);
        out
    }
}
