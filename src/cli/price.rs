//! Price command implementation

use crate::config::Config;
use crate::feed::PriceFeedClient;
use crate::relay::{render_board, render_quote};
use clap::Args;

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Base assets to look up (e.g. BTC ETH)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Skip the stream and query REST only
    #[arg(long)]
    pub rest_only: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl PriceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = PriceFeedClient::from_config(config.feed.clone())?;

        if !self.rest_only {
            feed.start(&self.symbols[..]).await;
        }

        let prices = feed.get_multiple_prices(&self.symbols[..]).await;
        feed.stop();

        tracing::debug!(found = prices.len(), requested = self.symbols.len(), "Lookup finished");

        if self.json {
            let snapshots: Vec<_> = prices.iter().map(|(_, s)| s).collect();
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        } else if let [(_, snapshot)] = prices.as_slice() {
            println!("{}", render_quote(snapshot));
        } else if prices.is_empty() {
            anyhow::bail!("no data for {}", self.symbols.join(", "));
        } else {
            println!("{}", render_board("📊 Bybit prices", &prices));
        }

        Ok(())
    }
}
