use clap::Parser;

use coursebot::cli::{self, Cli, Commands, ConfigSubcommands};
use coursebot::config::AppConfig;
use coursebot::core::Result;
use coursebot::logging;

fn run_config_command(command: &ConfigSubcommands, config: &AppConfig) -> Result<()> {
    match command {
        ConfigSubcommands::Init => match AppConfig::init_default() {
            Ok(path) => {
                println!("✓ Created config file at {}", path.display());
            }
            Err(e) => {
                eprintln!("✗ Failed to create config: {e}");
            }
        },
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("✗ Could not determine config path"),
        },
        ConfigSubcommands::Show => print!("{}", config.to_toml()?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref());

    let config = AppConfig::load().with_overrides(cli.api_base.clone(), cli.no_stream);
    tracing::debug!(api_base_url = %config.api_base_url, mode = %config.mode, "Config loaded");

    match &cli.command {
        Some(Commands::Config { command }) => run_config_command(command, &config),
        Some(Commands::Ask { question }) => cli::run_ask(&config, &question.join(" ")).await,
        Some(Commands::Chat) | None => cli::run_chat(&config).await,
    }
}
