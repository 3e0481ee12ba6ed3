//! CLI interface for ticker-cache
//!
//! Provides subcommands for:
//! - `run`: Stream prices, broadcast boards, and answer commands on stdin
//! - `price`: One-shot price lookup
//! - `config`: Show effective configuration

mod price;
mod run;

pub use price::PriceArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ticker-cache")]
#[command(about = "Live spot price cache fed by the Bybit ticker stream")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream prices and relay commands from stdin
    Run(RunArgs),
    /// Look up prices once and exit
    Price(PriceArgs),
    /// Show configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_command() {
        let cli = Cli::try_parse_from(["ticker-cache", "price", "btc", "eth", "--rest-only"]).unwrap();
        assert_eq!(cli.config, "config.toml");
        match cli.command {
            Commands::Price(args) => {
                assert_eq!(args.symbols, vec!["btc", "eth"]);
                assert!(args.rest_only);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from(["ticker-cache", "-c", "alt.toml", "run", "--no-broadcast"]).unwrap();
        assert_eq!(cli.config, "alt.toml");
        assert!(matches!(
            cli.command,
            Commands::Run(RunArgs { no_broadcast: true, no_health: false, .. })
        ));

        let cli = Cli::try_parse_from(["ticker-cache", "run", "--no-health"]).unwrap();
        assert!(matches!(cli.command, Commands::Run(RunArgs { no_health: true, .. })));
    }

    #[test]
    fn test_price_requires_symbol() {
        assert!(Cli::try_parse_from(["ticker-cache", "price"]).is_err());
    }
}
