// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Middleweight Java command-line interface.
//!
//! This is the main entry point for the `mwj` command.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use miette::Result;
use mwj_cli::commands::check::{CheckOptions, check};
use mwj_cli::commands::run::{RunOptions, run};
use mwj_cli::config::{self, Config};
use mwj_cli::logging;

/// MWJ: an interpreter and type checker for a small subset of Java
#[derive(Debug, Parser)]
#[command(name = "mwj")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse and run a program
    Run {
        /// Program AST as JSON
        program: Utf8PathBuf,

        /// Source file the program was parsed from, shown in diagnostics
        #[arg(long)]
        source: Option<Utf8PathBuf>,

        /// Run without static analysis
        #[arg(long)]
        no_analyse: bool,
    },

    /// Analyse a program without running it
    Check {
        /// Program AST as JSON
        program: Utf8PathBuf,

        /// Source file the program was parsed from, shown in diagnostics
        #[arg(long)]
        source: Option<Utf8PathBuf>,

        /// Print the analysed program as JSON
        #[arg(long)]
        dump: bool,
    },
}

impl Command {
    fn program(&self) -> &Utf8Path {
        match self {
            Self::Run { program, .. } | Self::Check { program, .. } => program,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load(cli.command.program());
    let context_lines = loaded
        .as_ref()
        .map_or(3, |config| config.diagnostics.context_lines);

    // Install miette's fancy error handler
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(context_lines)
                .build(),
        )
    }))?;

    let result = loaded.and_then(|config: Config| {
        logging::init(cli.verbose, config.log.filter.as_deref());
        match cli.command {
            Command::Run {
                program,
                source,
                no_analyse,
            } => run(
                &RunOptions {
                    program,
                    source,
                    no_analyse,
                },
                &config,
                std::io::stdout(),
            ),
            Command::Check {
                program,
                source,
                dump,
            } => check(
                &CheckOptions {
                    program,
                    source,
                    dump,
                },
                &mut std::io::stdout().lock(),
            ),
        }
    });

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
