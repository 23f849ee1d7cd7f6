use super::args::{Cli, Commands};
use super::handlers;
use super::logging;
use crate::config::Config;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.log_level.or(config.log_level));

    match cli.command {
        Commands::Normalize { file } => {
            handlers::normalize::handle(file.as_deref(), config.normalize.flush_each_event)
        }

        Commands::Session {
            file,
            canonical,
            summary,
            compact,
        } => {
            let output = if summary {
                handlers::session::Output::Summary
            } else if compact || !config.session.pretty {
                handlers::session::Output::Compact
            } else {
                handlers::session::Output::Pretty
            };
            handlers::session::handle(file.as_deref(), canonical, output)
        }
    }
}
