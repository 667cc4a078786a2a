// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup.
//!
//! Logs always go to stderr so they never mix with program output.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default directive when nothing else is configured.
const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive. `-v` flags win over `RUST_LOG`, which wins over
/// the config file.
#[must_use]
pub fn filter_directive(verbose: u8, env: Option<&str>, configured: Option<&str>) -> String {
    match verbose {
        0 => env
            .filter(|directive| !directive.is_empty())
            .or(configured)
            .unwrap_or(DEFAULT_FILTER)
            .to_owned(),
        1 => "mwj_core=debug,mwj_cli=debug".to_owned(),
        _ => "mwj_core=trace,mwj_cli=trace".to_owned(),
    }
}

/// Installs the global subscriber. Does nothing if one is already installed.
pub fn init(verbose: u8, configured: Option<&str>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(verbose, env.as_deref(), configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_everything() {
        assert_eq!(
            filter_directive(1, Some("info"), Some("error")),
            "mwj_core=debug,mwj_cli=debug"
        );
        assert_eq!(filter_directive(3, None, None), "mwj_core=trace,mwj_cli=trace");
    }

    #[test]
    fn environment_beats_config() {
        assert_eq!(filter_directive(0, Some("info"), Some("error")), "info");
        assert_eq!(filter_directive(0, Some(""), Some("error")), "error");
    }

    #[test]
    fn falls_back_to_warn() {
        assert_eq!(filter_directive(0, None, None), "warn");
    }
}
