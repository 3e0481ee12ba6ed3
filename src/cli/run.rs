//! Run command implementation

use crate::config::Config;
use crate::feed::PriceFeedClient;
use crate::health;
use crate::relay::{run_broadcast, CommandRelay, LogSink, WatchlistBook};
use clap::Args;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Session id used for commands typed on stdin
const CONSOLE_SESSION: &str = "console";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Disable the scheduled price broadcast
    #[arg(long)]
    pub no_broadcast: bool,

    /// Do not serve the liveness endpoint
    #[arg(long)]
    pub no_health: bool,

    /// Extra base assets to stream on top of the configured ones
    #[arg(short, long, value_delimiter = ',')]
    pub symbols: Vec<String>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut symbols = config.feed.symbols.clone();
        symbols.extend(self.symbols.iter().cloned());

        let feed = Arc::new(PriceFeedClient::from_config(config.feed.clone())?);
        feed.start(&symbols[..]).await;

        tracing::info!(
            connected = feed.is_connected(),
            cached = feed.cached_symbols().len(),
            "Price feed warmed up"
        );

        let broadcast = if config.relay.broadcast_enabled && !self.no_broadcast {
            Some(tokio::spawn(run_broadcast(
                Arc::clone(&feed),
                config.feed.symbols.clone(),
                Arc::new(LogSink),
                config.relay.first_broadcast(),
                config.relay.broadcast_interval(),
            )))
        } else {
            None
        };

        let liveness = if config.health.enabled && !self.no_health {
            let (_, handle) = health::serve(Arc::clone(&feed), config.health.addr()?).await?;
            Some(handle)
        } else {
            None
        };

        let relay = CommandRelay::new(Arc::clone(&feed), WatchlistBook::new(&config.feed.symbols[..]));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => {}
                        Some(line) => println!("{}\n", relay.handle(CONSOLE_SESSION, &line).await),
                        None => {
                            tracing::info!("stdin closed, streaming until Ctrl-C");
                            tokio::signal::ctrl_c().await?;
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        tracing::info!("Shutting down");
        for handle in [broadcast, liveness].into_iter().flatten() {
            handle.abort();
        }
        feed.stop();

        Ok(())
    }
}
