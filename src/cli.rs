// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Run front-end build tasks in dependency order, or serve them with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (e.g. `dist`, `serve`, `clean`, `showconf`).
    #[arg(value_name = "TASK", default_value = "dist")]
    pub task: String,

    /// Build environment. Falls back to `NODE_ENV`, then `dev`.
    #[arg(long, value_name = "NAME")]
    pub env: Option<String>,

    /// Force minification even in the `dev` environment.
    ///
    /// `--uglify` alone means `--uglify=true`.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub uglify: Option<bool>,

    /// Project root containing `config/`, `src/`, `assets/`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the task graph in execution order and exit without running anything.
    #[arg(long)]
    pub list: bool,
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
