//! Command relay
//!
//! Turns chat-style commands into plain-text replies backed by the price
//! feed. Transport-agnostic: the binary wires it to stdin and to a log sink
//! for scheduled broadcasts.

mod broadcast;
mod command;
pub mod format;
mod watchlist;

pub use broadcast::{broadcast_once, run_broadcast, BroadcastSink, LogSink};
pub use command::{Command, CommandError};
pub use watchlist::WatchlistBook;

use crate::feed::{FallbackSource, PriceFeedClient, TickerSnapshot};
use chrono::Local;
use format::{format_amount, format_number, format_percentage, format_quote_price};
use std::fmt::Write;
use std::sync::Arc;

const HELP_TEXT: &str = "\
Commands:
/price <coin>  - live price (e.g. /price BTC)
/prices        - prices for your watchlist
/market        - market overview
/add <coin>    - add a coin to your watchlist
/remove <coin> - remove a coin from your watchlist
/list          - show your watchlist
/help          - show this help";

pub struct CommandRelay<F> {
    feed: Arc<PriceFeedClient<F>>,
    watchlists: WatchlistBook,
}

impl<F: FallbackSource> CommandRelay<F> {
    pub fn new(feed: Arc<PriceFeedClient<F>>, watchlists: WatchlistBook) -> Self {
        Self { feed, watchlists }
    }

    pub fn watchlists(&self) -> &WatchlistBook {
        &self.watchlists
    }

    /// Reply to one line of input from `session`
    pub async fn handle(&self, session: &str, text: &str) -> String {
        match Command::parse(text) {
            Ok(command) => self.execute(session, command).await,
            Err(e) => format!("❌ {}. Try /help", e),
        }
    }

    pub async fn execute(&self, session: &str, command: Command) -> String {
        tracing::debug!(session, ?command, "Handling command");

        match command {
            Command::Start => format!("🚀 Crypto price relay (Bybit stream)\n\n{}", HELP_TEXT),
            Command::Help => HELP_TEXT.to_string(),
            Command::Price(symbol) => match self.feed.get_price(&symbol).await {
                Some(snapshot) => render_quote(&snapshot),
                None => format!("❌ No data for {}", symbol),
            },
            Command::Prices => {
                let watchlist = self.watchlists.list(session);
                let prices = self.feed.get_multiple_prices(&watchlist[..]).await;
                if prices.is_empty() {
                    "❌ No prices available".to_string()
                } else {
                    render_board("📊 Bybit prices", &prices)
                }
            }
            Command::Market => self.render_market().await,
            Command::Add(symbol) => {
                if self.watchlists.contains(session, &symbol) {
                    return format!("ℹ️ {} is already on your watchlist", symbol);
                }
                if self.feed.get_price(&symbol).await.is_none() {
                    return format!("❌ No data for {}", symbol);
                }
                self.watchlists.add(session, &symbol);
                format!("✅ Added {}", symbol)
            }
            Command::Remove(symbol) => {
                if self.watchlists.remove(session, &symbol) {
                    format!("✅ Removed {}", symbol)
                } else {
                    format!("❌ {} is not on your watchlist", symbol)
                }
            }
            Command::List => self.render_list(session).await,
        }
    }

    async fn render_market(&self) -> String {
        let btc = self.feed.get_price("BTC").await;
        let eth = self.feed.get_price("ETH").await;
        let (Some(btc), Some(eth)) = (btc, eth) else {
            return "❌ Market data unavailable".to_string();
        };

        format!(
            "🌍 Market overview\n\nBTC: ${}\nETH: ${}\n\nStream: {}\n🕐 {}",
            format_amount(btc.price),
            format_amount(eth.price),
            stream_status(self.feed.is_connected()),
            Local::now().format("%H:%M:%S %d/%m/%Y"),
        )
    }

    async fn render_list(&self, session: &str) -> String {
        let watchlist = self.watchlists.list(session);
        if watchlist.is_empty() {
            return "📋 Your watchlist is empty".to_string();
        }

        let mut out = String::from("📋 Watchlist:\n\n");
        for (i, symbol) in watchlist.iter().enumerate() {
            let status = match self.feed.get_price(symbol).await {
                Some(snapshot) => format!("✅ ${}", format_amount(snapshot.price)),
                None => "⏳ waiting for data".to_string(),
            };
            let _ = writeln!(out, "{}. {}: {}", i + 1, symbol, status);
        }
        let _ = write!(out, "\nStream: {}", stream_status(self.feed.is_connected()));
        out
    }
}

fn stream_status(connected: bool) -> &'static str {
    if connected {
        "✅ online"
    } else {
        "❌ offline"
    }
}

/// Detailed quote for a single symbol
pub fn render_quote(snapshot: &TickerSnapshot) -> String {
    format!(
        "💰 {} / USDT\n\n\
         💵 Price: {}\n\
         📊 24h: {}\n\n\
         📈 24h high: {}\n\
         📉 24h low: {}\n\
         💱 24h volume: {}\n\n\
         🕐 {}",
        snapshot.symbol,
        format_quote_price(snapshot.price),
        format_percentage(snapshot.price_change_24h),
        format_quote_price(snapshot.high_24h),
        format_quote_price(snapshot.low_24h),
        format_number(snapshot.volume_24h),
        snapshot.observed_at.with_timezone(&Local).format("%H:%M:%S"),
    )
}

/// Multi-symbol board in the order given
pub fn render_board(title: &str, prices: &[(String, TickerSnapshot)]) -> String {
    let mut out = format!("{}\n\n", title);
    for (symbol, snapshot) in prices {
        let _ = writeln!(out, "{}: ${}", symbol, format_amount(snapshot.price));
        let change = snapshot.price_change_24h;
        let marker = if change > 0.0 { "📈 +" } else { "📉 " };
        let _ = writeln!(out, "  {}{:.2}%\n", marker, change);
    }
    let _ = write!(out, "🕐 {}", Local::now().format("%H:%M:%S"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedFallback(Vec<TickerSnapshot>);

    #[async_trait]
    impl FallbackSource for FixedFallback {
        async fn fetch(&self, symbol: &str) -> Option<TickerSnapshot> {
            self.0.iter().find(|s| s.symbol == symbol).cloned()
        }
    }

    fn snapshot(symbol: &str, price: f64, change: f64) -> TickerSnapshot {
        TickerSnapshot {
            symbol: symbol.to_string(),
            price,
            price_change_24h: change,
            high_24h: price,
            low_24h: price,
            volume_24h: 2_500_000.0,
            bid: 0.0,
            ask: 0.0,
            observed_at: Utc::now(),
        }
    }

    fn relay(defaults: &[&str]) -> CommandRelay<FixedFallback> {
        let fallback = FixedFallback(vec![
            snapshot("BTC", 65000.5, 2.31),
            snapshot("ETH", 3000.0, -1.2),
            snapshot("DOGE", 0.12, 0.0),
        ]);
        let feed = Arc::new(PriceFeedClient::new(FeedConfig::default(), fallback));
        CommandRelay::new(feed, WatchlistBook::new(defaults))
    }

    #[tokio::test]
    async fn test_price_command() {
        let relay = relay(&["BTC"]);
        let reply = relay.handle("s1", "/price btc").await;
        assert!(reply.contains("BTC / USDT"));
        assert!(reply.contains("$65,000.50"));
        assert!(reply.contains("+2.31%"));
        assert!(reply.contains("$2.50M"));
    }

    #[tokio::test]
    async fn test_price_command_sub_dollar() {
        let relay = relay(&["BTC"]);
        let reply = relay.handle("s1", "/xiaofa doge").await;
        assert!(reply.contains("💵 Price: $0.1200\n"));
        assert!(reply.contains("➡️ 0.00%"));
    }

    #[tokio::test]
    async fn test_price_command_no_data() {
        let relay = relay(&["BTC"]);
        assert_eq!(relay.handle("s1", "/price zzz").await, "❌ No data for ZZZ");
    }

    #[tokio::test]
    async fn test_prices_board_keeps_watchlist_order() {
        let relay = relay(&["ETH", "ZZZ", "BTC"]);
        let reply = relay.handle("s1", "/prices").await;

        let eth = reply.find("ETH:").unwrap();
        let btc = reply.find("BTC:").unwrap();
        assert!(eth < btc);
        assert!(!reply.contains("ZZZ"));
        assert!(reply.contains("📉 -1.20%"));
    }

    #[tokio::test]
    async fn test_add_validates_symbol() {
        let relay = relay(&["BTC"]);

        assert_eq!(relay.handle("s1", "/add doge").await, "✅ Added DOGE");
        assert_eq!(
            relay.handle("s1", "/add DOGE").await,
            "ℹ️ DOGE is already on your watchlist"
        );
        assert_eq!(relay.handle("s1", "/add zzz").await, "❌ No data for ZZZ");
        assert_eq!(relay.watchlists().list("s1"), vec!["BTC", "DOGE"]);
    }

    #[tokio::test]
    async fn test_remove_and_list() {
        let relay = relay(&["BTC", "ETH"]);

        assert_eq!(relay.handle("s1", "/remove btc").await, "✅ Removed BTC");
        assert_eq!(
            relay.handle("s1", "/remove btc").await,
            "❌ BTC is not on your watchlist"
        );

        let list = relay.handle("s1", "/list").await;
        assert!(list.contains("1. ETH: ✅ $3,000.00"));
        assert!(list.contains("Stream: ❌ offline"));
    }

    #[tokio::test]
    async fn test_market_overview() {
        let relay = relay(&[]);
        let reply = relay.handle("s1", "/market").await;
        assert!(reply.contains("BTC: $65,000.50"));
        assert!(reply.contains("ETH: $3,000.00"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let relay = relay(&[]);
        assert_eq!(
            relay.handle("s1", "/moon").await,
            "❌ unknown command /moon. Try /help"
        );
    }

    #[test]
    fn test_render_board_empty_change_marker() {
        let board = render_board("Title", &[("DOGE".to_string(), snapshot("DOGE", 0.12, 0.0))]);
        assert!(board.starts_with("Title\n\nDOGE: $0.12\n  📉 0.00%"));
    }
}
