//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "leveler", version, about = "Knob-turning bed leveling")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/leveler.toml")]
    pub config: PathBuf,

    /// Replay probe readings from a CSV (header `z_mm`) instead of the simulated probe
    #[arg(long = "probe-script", value_name = "FILE")]
    pub probe_script: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the corners and turn the leveling knobs
    Level {
        /// Corner to correct once (0=SW, 1=NW, 2=NE, 3=SE); omit or -1 for a full scan
        #[arg(
            short = 'R',
            long = "point",
            value_name = "INDEX",
            allow_negative_numbers = true
        )]
        point: Option<i32>,
    },
    /// Load config and backends without moving anything
    SelfCheck,
}
