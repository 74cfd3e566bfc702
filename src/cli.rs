// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::TriggerWhileRunningBehaviour;

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build front-end assets as a task graph and inject them into your HTML.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Its directory is the project root.
    ///
    /// Default: `Assetflow.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH", default_value = "Assetflow.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// What to do. Lists the available tasks when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Remove the transient output directory.
    Clean,
    /// Transpile, compile and inject everything once.
    Build,
    /// Build once, then rebuild on every change to the watched sources.
    Watch {
        /// Override `triggered_while_running_behaviour` (queue, cancel, parallel).
        #[arg(long, value_name = "BEHAVIOUR")]
        on_trigger: Option<TriggerWhileRunningBehaviour>,
    },
    /// Lint script sources.
    Lint,
    /// List the registered tasks and their prerequisites.
    Tasks,
    /// Run a single task (and its prerequisites).
    Run {
        /// Task name, e.g. `styles`.
        task: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
