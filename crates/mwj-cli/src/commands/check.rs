// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Check programs without running them.

use std::io::Write;

use camino::Utf8PathBuf;
use miette::{IntoDiagnostic, Result};
use mwj_core::analyse;
use tracing::instrument;

use crate::diagnostic::AnalysisDiagnostic;

/// Options of `mwj check`.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub program: Utf8PathBuf,
    pub source: Option<Utf8PathBuf>,
    /// Print the analysed program as JSON instead of a summary line.
    pub dump: bool,
}

/// Runs the static analyzer over a program.
///
/// On success writes either `<source>: ok` or, with `dump`, the program after
/// analysis: class names fully qualified and operator chains regrouped.
#[instrument(skip_all, fields(program = %options.program))]
pub fn check(options: &CheckOptions, output: &mut impl Write) -> Result<()> {
    let mut program = crate::load_program(&options.program)?;
    let source = crate::load_source(&options.program, options.source.as_deref(), &program)?;

    analyse(&mut program).map_err(|error| AnalysisDiagnostic::new(&error, source.as_deref()))?;

    if options.dump {
        serde_json::to_writer_pretty(&mut *output, &program).into_diagnostic()?;
        writeln!(output).into_diagnostic()?;
    } else {
        writeln!(output, "{}: ok", program.source).into_diagnostic()?;
    }
    Ok(())
}
