mod cli;
mod config;
mod oneshot;
mod platform;

use anyhow::Result;
use clap::Parser;
use engine_logging::{engine_error, engine_info, LogDestination};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;

    let log_file = config.log_file_for(cli.command.name());
    let destination = if cli.command.is_full_screen() {
        LogDestination::File(log_file)
    } else {
        LogDestination::Both(log_file)
    };
    engine_logging::initialize(&destination, config.log_level);
    engine_info!("datachat {} starting", cli.command.name());
    config.log_summary();

    let result = match &cli.command {
        Command::Chat => platform::chat::run(&config),
        Command::Input => platform::capture::run(&config),
        Command::Observe => platform::observe::run(&config),
        Command::Analyze => oneshot::run_analyze(&config),
        Command::Notebook { output } => oneshot::run_notebook(&config, output),
    };
    if let Err(err) = &result {
        engine_error!("datachat {} failed: {:#}", cli.command.name(), err);
    }
    result
}
