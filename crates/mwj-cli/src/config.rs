// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `mwj.toml` discovery and parsing.
//!
//! **DDD Context:** CLI - Configuration
//!
//! The configuration file is optional. It is looked up in the directory of the
//! program being run and then in each parent directory; the first one found
//! wins. Command-line flags override anything set here.
//!
//! ```toml
//! [run]
//! analyse = true
//!
//! [log]
//! filter = "mwj_core=debug"
//!
//! [diagnostics]
//! context_lines = 3
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "mwj.toml";

/// Settings read from `mwj.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub log: LogConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Run the static analyzer before executing.
    pub analyse: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { analyse: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// A `tracing-subscriber` filter directive, e.g. `mwj_core=trace`.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Source lines shown around a reported location.
    pub context_lines: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

/// Finds the nearest `mwj.toml` at or above `start`.
///
/// `start` may be a file, in which case the search begins in its directory.
#[must_use]
pub fn discover(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let dir = if start.is_file() { start.parent()? } else { start };
    dir.ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Parses the configuration file at `path`.
pub fn parse(path: &Utf8Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{path}'"))?;
    toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config '{path}'"))
}

/// Loads the configuration that applies to `program`, or the defaults if
/// there is none.
pub fn load(program: &Utf8Path) -> Result<Config> {
    match discover(program) {
        Some(path) => {
            debug!(%path, "using config");
            parse(&path)
        }
        None => Ok(Config::default()),
    }
}
