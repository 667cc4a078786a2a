// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Command-line driver for Middleweight Java programs.
//!
//! **DDD Context:** CLI
//!
//! Programs are handed over as JSON-serialized ASTs produced by an external
//! parser. The driver loads them, optionally runs the static analyzer and then
//! executes `main`, rendering failures with miette.

pub mod commands;
pub mod config;
pub mod diagnostic;
pub mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use mwj_core::ast::Program;
use std::fs;
use tracing::debug;

/// Reads a serialized program.
pub fn load_program(path: &Utf8Path) -> Result<Program> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read program '{path}'"))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse program '{path}'"))
}

/// Reads the source text a program was parsed from, for diagnostics.
///
/// An explicit `--source` path must exist. Otherwise the file named by the
/// program's source name is looked up next to the AST file and silently
/// skipped when absent.
pub fn load_source(
    program_path: &Utf8Path,
    explicit: Option<&Utf8Path>,
    program: &Program,
) -> Result<Option<String>> {
    if let Some(path) = explicit {
        return fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read source '{path}'"))
            .map(Some);
    }
    let sibling: Utf8PathBuf = program_path
        .parent()
        .unwrap_or_else(|| Utf8Path::new("."))
        .join(program.source.as_str());
    if sibling.is_file() {
        debug!(path = %sibling, "found program source");
        Ok(fs::read_to_string(&sibling).ok())
    } else {
        Ok(None)
    }
}
