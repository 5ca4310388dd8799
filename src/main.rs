//! Hireflow CLI entry point.

use clap::Parser;

use hireflow::cli::{Cli, Commands};
use hireflow::infrastructure::config::ConfigLoader;
use hireflow::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging follows project config when it loads; command errors about the
    // config itself are reported by the command.
    let log_config = ConfigLoader::load()
        .map(|config| LogConfig::from(&config.logging))
        .unwrap_or_default();
    let _logger = LoggerImpl::init(&log_config).ok();

    let result = match cli.command {
        Commands::Init(args) => hireflow::cli::commands::init::execute(args, cli.json).await,
        Commands::Application(args) => {
            hireflow::cli::commands::application::execute(args, cli.json).await
        }
        Commands::Asset(args) => hireflow::cli::commands::asset::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        hireflow::cli::handle_error(err, cli.json);
    }
}
