use clap::Parser;
use ticker_cache::cli::{Cli, Commands};
use ticker_cache::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Missing file means defaults; a malformed one is an error
    let config = Config::load_or_default(&cli.config)?;

    // Initialize telemetry
    ticker_cache::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(config = %cli.config, "Starting price relay");
            args.execute(&config).await?;
        }
        Commands::Price(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
