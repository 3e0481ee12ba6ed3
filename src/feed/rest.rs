//! Bybit REST ticker lookup, used when the stream has nothing for a symbol

use super::bybit::{pair_symbol, RawTicker, DEFAULT_QUOTE};
use super::{FallbackSource, TickerSnapshot};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Bybit REST base URL
pub const BYBIT_REST_URL: &str = "https://api.bybit.com";

/// Configuration for the REST fallback
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Market category query parameter
    pub category: String,
    /// Quote asset appended to the requested base symbol
    pub quote: String,
    /// Hard ceiling on one lookup
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: BYBIT_REST_URL.to_string(),
            category: "spot".to_string(),
            quote: DEFAULT_QUOTE.to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Why a lookup produced nothing
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: Option<TickersResult>,
}

#[derive(Debug, Default, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<RawTicker>,
}

/// Client for the `/v5/market/tickers` endpoint
pub struct BybitRestClient {
    config: RestConfig,
    client: Client,
}

impl BybitRestClient {
    /// Create a client with custom configuration
    pub fn with_config(config: RestConfig) -> Result<Self, FallbackError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Fetch the ticker for one base symbol
    ///
    /// `Ok(None)` means the exchange answered but listed nothing. An entry
    /// without a symbol is keyed by the requested one.
    pub async fn fetch_ticker(&self, symbol: &str) -> Result<Option<TickerSnapshot>, FallbackError> {
        let url = format!("{}/v5/market/tickers", self.config.base_url);
        let pair = pair_symbol(symbol, &self.config.quote);

        tracing::debug!(url = %url, pair = %pair, "Fetching ticker from Bybit REST");

        let response = self
            .client
            .get(&url)
            .query(&[("category", self.config.category.as_str()), ("symbol", pair.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FallbackError::Status(response.status()));
        }

        let body: TickersResponse = response.json().await?;
        if body.ret_code != 0 {
            return Err(FallbackError::Api {
                code: body.ret_code,
                message: body.ret_msg,
            });
        }

        Ok(body
            .result
            .and_then(|r| r.list.into_iter().next())
            .map(|mut raw| {
                if raw.symbol.trim().is_empty() {
                    raw.symbol = pair;
                }
                raw.into_snapshot(&self.config.quote)
            }))
    }
}

#[async_trait]
impl FallbackSource for BybitRestClient {
    async fn fetch(&self, symbol: &str) -> Option<TickerSnapshot> {
        match self.fetch_ticker(symbol).await {
            Ok(snapshot) => {
                if snapshot.is_none() {
                    tracing::debug!(symbol, "Bybit REST returned no ticker");
                }
                snapshot
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Fallback ticker lookup failed");
                None
            }
        }
    }
}
