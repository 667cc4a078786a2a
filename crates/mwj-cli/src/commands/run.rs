// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Run Middleweight Java programs.

use std::io::Write;

use camino::Utf8PathBuf;
use miette::Result;
use mwj_core::{Interpreter, RuntimeError, analyse};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::diagnostic::{AnalysisDiagnostic, RuntimeDiagnostic};

/// Options of `mwj run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The serialized program.
    pub program: Utf8PathBuf,
    /// Source text the program was parsed from, for diagnostics.
    pub source: Option<Utf8PathBuf>,
    /// Skip the static analyzer, overriding `run.analyse`.
    pub no_analyse: bool,
}

/// Analyses (unless disabled) and runs a program, writing its output to
/// `output`.
#[instrument(skip_all, fields(program = %options.program))]
pub fn run(options: &RunOptions, config: &Config, output: impl Write + 'static) -> Result<()> {
    let mut program = crate::load_program(&options.program)?;
    let source = crate::load_source(&options.program, options.source.as_deref(), &program)?;

    if config.run.analyse && !options.no_analyse {
        analyse(&mut program)
            .map_err(|error| AnalysisDiagnostic::new(&error, source.as_deref()))?;
    } else {
        debug!("analysis skipped");
    }

    let runtime = |error: RuntimeError| RuntimeDiagnostic::new(&error, source.as_deref());
    Interpreter::new(&program)
        .map_err(runtime)?
        .with_output(output)
        .run()
        .map_err(runtime)?;
    Ok(())
}
