//! Bybit v5 public spot stream: subscribe frames and message decoding

use super::TickerSnapshot;
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Bybit spot WebSocket URL
pub const BYBIT_WS_URL: &str = "wss://stream.bybit.com/v5/public/spot";

/// Quote asset appended to every subscribed base symbol
pub const DEFAULT_QUOTE: &str = "USDT";

const TICKER_TOPIC_PREFIX: &str = "tickers.";

/// Decoding failures for a single inbound frame
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ticker message on {topic} has no data object")]
    MissingData { topic: String },
    #[error("ticker message on {topic} has no symbol")]
    MissingSymbol { topic: String },
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Ticker update
    Ticker(TickerSnapshot),
    /// Reply to an `op` request such as subscribe or ping
    OpReply {
        op: String,
        success: bool,
        message: String,
    },
    /// Anything else; other topics are skipped
    Ignored,
}

/// Top-level frame envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    op: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    ret_msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Ticker record shared by the stream and the REST tickers endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTicker {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "lastPrice", default, deserialize_with = "lenient_f64")]
    pub last_price: f64,
    #[serde(rename = "price24hPcnt", default, deserialize_with = "lenient_f64")]
    pub price_24h_pcnt: f64,
    #[serde(rename = "highPrice24h", default, deserialize_with = "lenient_f64")]
    pub high_price_24h: f64,
    #[serde(rename = "lowPrice24h", default, deserialize_with = "lenient_f64")]
    pub low_price_24h: f64,
    #[serde(rename = "volume24h", default, deserialize_with = "lenient_f64")]
    pub volume_24h: f64,
    #[serde(rename = "bid1Price", default, deserialize_with = "lenient_f64")]
    pub bid1_price: f64,
    #[serde(rename = "ask1Price", default, deserialize_with = "lenient_f64")]
    pub ask1_price: f64,
}

impl RawTicker {
    /// Convert into a snapshot keyed by base asset
    pub(crate) fn into_snapshot(self, quote: &str) -> TickerSnapshot {
        TickerSnapshot {
            symbol: base_symbol(&self.symbol, quote),
            price: self.last_price,
            price_change_24h: self.price_24h_pcnt * 100.0,
            high_24h: self.high_price_24h,
            low_24h: self.low_price_24h,
            volume_24h: self.volume_24h,
            bid: self.bid1_price,
            ask: self.ask1_price,
            observed_at: Utc::now(),
        }
    }
}

/// Bybit sends decimals as strings; anything unparseable becomes 0.0
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Exchange pair for a base asset, e.g. `btc` -> `BTCUSDT`
pub fn pair_symbol(base: &str, quote: &str) -> String {
    format!(
        "{}{}",
        base.trim().to_uppercase(),
        quote.trim().to_uppercase()
    )
}

/// Base asset for an exchange pair, e.g. `BTCUSDT` -> `BTC`
pub fn base_symbol(pair: &str, quote: &str) -> String {
    let pair = pair.trim().to_uppercase();
    let quote = quote.trim().to_uppercase();
    match pair.strip_suffix(quote.as_str()) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => pair,
    }
}

/// Subscribe frame for one exchange pair
pub fn subscribe_frame(pair: &str) -> String {
    serde_json::json!({
        "op": "subscribe",
        "args": [format!("{}{}", TICKER_TOPIC_PREFIX, pair)],
    })
    .to_string()
}

/// Decode one inbound text frame
pub fn parse_message(text: &str, quote: &str) -> Result<Inbound, DecodeError> {
    let envelope: Envelope = serde_json::from_str(text)?;

    if let Some(topic) = envelope.topic {
        if !topic.starts_with(TICKER_TOPIC_PREFIX) {
            return Ok(Inbound::Ignored);
        }

        let data = match envelope.data {
            Some(data @ Value::Object(_)) => data,
            _ => return Err(DecodeError::MissingData { topic }),
        };
        let raw: RawTicker = serde_json::from_value(data)?;
        if raw.symbol.trim().is_empty() {
            return Err(DecodeError::MissingSymbol { topic });
        }

        return Ok(Inbound::Ticker(raw.into_snapshot(quote)));
    }

    if let Some(op) = envelope.op {
        return Ok(Inbound::OpReply {
            op,
            success: envelope.success.unwrap_or(false),
            message: envelope.ret_msg.unwrap_or_default(),
        });
    }

    Ok(Inbound::Ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(msg: &str) -> TickerSnapshot {
        match parse_message(msg, DEFAULT_QUOTE).unwrap() {
            Inbound::Ticker(snapshot) => snapshot,
            other => panic!("expected ticker, got {:?}", other),
        }
    }

    #[test]
    fn test_pair_and_base_symbol() {
        assert_eq!(pair_symbol("btc", DEFAULT_QUOTE), "BTCUSDT");
        assert_eq!(base_symbol("BTCUSDT", DEFAULT_QUOTE), "BTC");
        assert_eq!(base_symbol("ethusdt", DEFAULT_QUOTE), "ETH");
        // Only the suffix is stripped
        assert_eq!(base_symbol("USDTUSDT", DEFAULT_QUOTE), "USDT");
        assert_eq!(base_symbol("USDT", DEFAULT_QUOTE), "USDT");
        assert_eq!(base_symbol("BTCUSDC", DEFAULT_QUOTE), "BTCUSDC");
    }

    #[test]
    fn test_lowercase_quote_is_normalized() {
        assert_eq!(pair_symbol("btc", "usdt"), "BTCUSDT");
        assert_eq!(base_symbol("BTCUSDT", " usdt "), "BTC");

        let frame: Value = serde_json::from_str(&subscribe_frame(&pair_symbol("btc", "usdt"))).unwrap();
        assert_eq!(frame["args"][0], "tickers.BTCUSDT");

        let msg = r#"{"topic":"tickers.BTCUSDT","data":{"symbol":"BTCUSDT","lastPrice":"1"}}"#;
        match parse_message(msg, "usdt").unwrap() {
            Inbound::Ticker(snapshot) => assert_eq!(snapshot.symbol, "BTC"),
            other => panic!("expected ticker, got {:?}", other),
        }
    }

    #[test]
    fn test_subscribe_frame() {
        let frame: Value = serde_json::from_str(&subscribe_frame("BTCUSDT")).unwrap();
        assert_eq!(
            frame,
            serde_json::json!({"op": "subscribe", "args": ["tickers.BTCUSDT"]})
        );
    }

    #[test]
    fn test_parse_ticker_message() {
        let msg = r#"{
            "topic": "tickers.BTCUSDT",
            "ts": 1673853746003,
            "type": "snapshot",
            "cs": 2588407389,
            "data": {
                "symbol": "BTCUSDT",
                "lastPrice": "65000.5",
                "highPrice24h": "66000",
                "lowPrice24h": "63000.25",
                "prevPrice24h": "63530",
                "volume24h": "1234.5",
                "turnover24h": "80000000",
                "price24hPcnt": "0.0231",
                "usdIndexPrice": "65001.1",
                "bid1Price": "65000.4",
                "ask1Price": "65000.6"
            }
        }"#;

        let snapshot = ticker(msg);
        assert_eq!(snapshot.symbol, "BTC");
        assert_eq!(snapshot.price, 65000.5);
        assert!((snapshot.price_change_24h - 2.31).abs() < 1e-9);
        assert_eq!(snapshot.high_24h, 66000.0);
        assert_eq!(snapshot.low_24h, 63000.25);
        assert_eq!(snapshot.volume_24h, 1234.5);
        assert_eq!(snapshot.bid, 65000.4);
        assert_eq!(snapshot.ask, 65000.6);
    }

    #[test]
    fn test_missing_numeric_fields_default_to_zero() {
        let msg = r#"{"topic":"tickers.SOLUSDT","data":{"symbol":"SOLUSDT","lastPrice":"150.1"}}"#;

        let snapshot = ticker(msg);
        assert_eq!(snapshot.symbol, "SOL");
        assert_eq!(snapshot.price, 150.1);
        assert_eq!(snapshot.price_change_24h, 0.0);
        assert_eq!(snapshot.high_24h, 0.0);
        assert_eq!(snapshot.low_24h, 0.0);
        assert_eq!(snapshot.volume_24h, 0.0);
        assert_eq!(snapshot.bid, 0.0);
        assert_eq!(snapshot.ask, 0.0);
    }

    #[test]
    fn test_unparseable_numeric_fields_default_to_zero() {
        let msg = r#"{"topic":"tickers.XRPUSDT","data":{
            "symbol":"XRPUSDT","lastPrice":"not_a_number","price24hPcnt":null,
            "highPrice24h":"NaN","lowPrice24h":"","volume24h":42,"bid1Price":{},"ask1Price":"0.51"}}"#;

        let snapshot = ticker(msg);
        assert_eq!(snapshot.price, 0.0);
        assert_eq!(snapshot.price_change_24h, 0.0);
        assert_eq!(snapshot.high_24h, 0.0);
        assert_eq!(snapshot.low_24h, 0.0);
        assert_eq!(snapshot.volume_24h, 42.0);
        assert_eq!(snapshot.bid, 0.0);
        assert_eq!(snapshot.ask, 0.51);
    }

    #[test]
    fn test_other_topics_ignored() {
        let msg = r#"{"topic":"orderbook.50.BTCUSDT","type":"delta","data":{"s":"BTCUSDT","b":[],"a":[]}}"#;
        assert_eq!(parse_message(msg, DEFAULT_QUOTE).unwrap(), Inbound::Ignored);

        let msg = r#"{"something":"else"}"#;
        assert_eq!(parse_message(msg, DEFAULT_QUOTE).unwrap(), Inbound::Ignored);
    }

    #[test]
    fn test_subscribe_reply() {
        let msg = r#"{"success":true,"ret_msg":"subscribe","conn_id":"abc","op":"subscribe"}"#;
        assert_eq!(
            parse_message(msg, DEFAULT_QUOTE).unwrap(),
            Inbound::OpReply {
                op: "subscribe".to_string(),
                success: true,
                message: "subscribe".to_string(),
            }
        );

        let msg = r#"{"success":false,"ret_msg":"Invalid symbol :[tickers.ZZZUSDT]","op":"subscribe"}"#;
        match parse_message(msg, DEFAULT_QUOTE).unwrap() {
            Inbound::OpReply { success, message, .. } => {
                assert!(!success);
                assert!(message.contains("ZZZUSDT"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_message("not valid json", DEFAULT_QUOTE),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_ticker_without_data_or_symbol() {
        let msg = r#"{"topic":"tickers.BTCUSDT"}"#;
        assert!(matches!(
            parse_message(msg, DEFAULT_QUOTE),
            Err(DecodeError::MissingData { .. })
        ));

        let msg = r#"{"topic":"tickers.BTCUSDT","data":{"lastPrice":"1"}}"#;
        assert!(matches!(
            parse_message(msg, DEFAULT_QUOTE),
            Err(DecodeError::MissingSymbol { .. })
        ));
    }
}
