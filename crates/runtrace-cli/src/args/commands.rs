use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Convert raw vendor NDJSON into canonical NDJSON, one event per line")]
    Normalize {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    #[command(about = "Rebuild a session from an event stream and print it as JSON")]
    Session {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Input is canonical NDJSON (e.g. output of `runtrace normalize`)
        #[arg(long)]
        canonical: bool,

        /// Print a one-line summary instead of the session
        #[arg(long, conflicts_with = "compact")]
        summary: bool,

        /// Print the session on a single line
        #[arg(long)]
        compact: bool,
    },
}
