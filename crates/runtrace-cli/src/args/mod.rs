mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "runtrace")]
#[command(
    about = "Normalize Claude and Codex agent event streams and rebuild them as sessions",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Log verbosity on stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file (default: $RUNTRACE_CONFIG, then <config dir>/runtrace/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
