//! SOL/USD price polling over HTTP
//!
//! Fetches the quote endpoint on a fixed interval and feeds valid prices
//! into the widget's update channel. Individual failures are logged and
//! skipped; the loop only stops once the widget drops the receiver.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::widget::MarketUpdate;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quote endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("no usable price in quote response")]
    InvalidPrice,
}

/// Price poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Quote endpoint URL.
    pub url: String,
    /// Poll period.
    pub interval: Duration,
}

/// Extract a SOL price from a quote response, tolerating the shapes
/// different quote providers use: a flat `price` field holding a string or
/// number (Binance ticker), a numeric `solana.usd` (CoinGecko), or a string
/// `data.amount` (Coinbase). The first shape present wins; a present but
/// unparseable `price` string does not fall through to the other shapes.
pub fn parse_sol_price(data: &Value) -> Option<f64> {
    if let Some(price) = data.get("price") {
        match price {
            Value::String(s) => return s.trim().parse().ok(),
            Value::Number(n) => return n.as_f64(),
            _ => {}
        }
    }
    if let Some(usd) = data.pointer("/solana/usd").and_then(Value::as_f64) {
        return Some(usd);
    }
    if let Some(amount) = data.pointer("/data/amount").and_then(Value::as_str) {
        return amount.trim().parse().ok();
    }
    None
}

/// One fetch of the quote endpoint. Rejects error statuses, unrecognized
/// response shapes, and non-finite or non-positive prices.
pub async fn fetch_sol_price(client: &Client, url: &str) -> Result<f64, PollError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(PollError::Status(response.status()));
    }
    let data: Value = response.json().await?;
    match parse_sol_price(&data) {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(PollError::InvalidPrice),
    }
}

/// Spawn the recurring poll loop. The first fetch happens immediately, then
/// once per `config.interval`.
pub fn spawn(config: PollerConfig, updates: mpsc::UnboundedSender<MarketUpdate>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "failed to build HTTP client, price polling disabled");
                return;
            }
        };

        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            url = %config.url,
            interval_ms = config.interval.as_millis() as u64,
            "price poller started"
        );

        loop {
            ticker.tick().await;
            match fetch_sol_price(&client, &config.url).await {
                Ok(price) => {
                    debug!(price, "SOL price updated");
                    if updates.send(MarketUpdate::SolPrice(price)).is_err() {
                        debug!("update channel closed, stopping price poller");
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "SOL price fetch failed"),
            }
        }
    })
}
