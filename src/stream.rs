//! PumpPortal trade stream client with auto-reconnection
//!
//! Subscribes to token trades for a single mint and feeds each reported
//! market cap into the widget's update channel. Reconnects forever with a
//! fixed delay; the streaming path is disabled for the whole session when no
//! mint is configured.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::widget::MarketUpdate;

/// Sentinel left in place when the operator has not configured a mint yet.
pub const MINT_PLACEHOLDER: &str = "YOUR_TOKEN_MINT";

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("connection error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trade stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Stream endpoint URL.
    pub endpoint: String,
    /// Token mint the subscription follows.
    pub mint: String,
    /// Optional API key, appended to the endpoint address.
    pub api_key: Option<String>,
    /// Fixed delay between reconnection attempts.
    pub reconnect_delay: Duration,
}

impl StreamConfig {
    /// The endpoint with the API key appended when one is configured.
    pub fn endpoint_url(&self) -> Result<Url, StreamError> {
        let mut url = Url::parse(&self.endpoint)?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("api-key", key);
        }
        Ok(url)
    }
}

/// Subscription request sent once per connection.
#[derive(Debug, Serialize)]
pub struct TradeSubscription {
    pub method: String,
    pub keys: Vec<String>,
}

impl TradeSubscription {
    pub fn new(mint: &str) -> Self {
        Self {
            method: "subscribeTokenTrade".to_string(),
            keys: vec![mint.to_string()],
        }
    }
}

/// Extract the market cap from a raw stream payload when it is a trade for
/// `mint`. `Ok(None)` covers subscription acks, trades for other tokens, and
/// payloads without a numeric `marketCapSol`; those keep the connection open
/// without logging noise.
pub fn market_cap_from_payload(text: &str, mint: &str) -> Result<Option<f64>, serde_json::Error> {
    let payload: Value = serde_json::from_str(text)?;
    if payload.get("mint").and_then(Value::as_str) != Some(mint) {
        return Ok(None);
    }
    Ok(payload.get("marketCapSol").and_then(Value::as_f64))
}

/// Spawn the reconnecting stream task. Returns `None` without spawning when
/// no mint is configured.
pub fn spawn(
    config: StreamConfig,
    updates: mpsc::UnboundedSender<MarketUpdate>,
) -> Option<JoinHandle<()>> {
    if config.mint.is_empty() || config.mint == MINT_PLACEHOLDER {
        warn!("no token mint configured, trade stream disabled");
        return None;
    }
    Some(tokio::spawn(connection_task(config, updates)))
}

/// Reconnect loop. Each session runs until the socket closes or errors, then
/// the loop sleeps the fixed delay and starts over. Retries are unlimited
/// and the delay never grows.
async fn connection_task(config: StreamConfig, updates: mpsc::UnboundedSender<MarketUpdate>) {
    loop {
        match connect_and_stream(&config, &updates).await {
            Ok(()) => warn!("trade stream closed"),
            Err(e) => warn!(error = %e, "trade stream error"),
        }

        if updates.is_closed() {
            debug!("update channel closed, stopping trade stream");
            break;
        }

        warn!(
            delay_ms = config.reconnect_delay.as_millis() as u64,
            "reconnecting to trade stream"
        );
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// One connect/subscribe/consume session.
async fn connect_and_stream(
    config: &StreamConfig,
    updates: &mpsc::UnboundedSender<MarketUpdate>,
) -> Result<(), StreamError> {
    let url = config.endpoint_url()?;
    info!(endpoint = %config.endpoint, "connecting to trade stream");

    let (ws_stream, _response) = connect_async(url.as_str()).await?;
    let (mut write, mut read) = ws_stream.split();

    let subscription = serde_json::to_string(&TradeSubscription::new(&config.mint))?;
    write.send(Message::Text(subscription.into())).await?;
    info!(mint = %config.mint, "subscribed to token trades");

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => match market_cap_from_payload(&text, &config.mint) {
                Ok(Some(market_cap_sol)) => {
                    debug!(market_cap_sol, "trade received");
                    if updates.send(MarketUpdate::MarketCapSol(market_cap_sol)).is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => debug!("ignoring non-matching stream payload"),
                Err(e) => warn!(error = %e, "unparseable stream payload"),
            },
            Ok(Message::Close(_)) => {
                debug!("close frame received");
                break;
            }
            Ok(_) => {
                // Ignore binary and ping/pong frames.
            }
            Err(e) => return Err(StreamError::Connection(e)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(mint: &str, api_key: Option<&str>) -> StreamConfig {
        StreamConfig {
            endpoint: "wss://pumpportal.fun/api/data".to_string(),
            mint: mint.to_string(),
            api_key: api_key.map(str::to_string),
            reconnect_delay: Duration::from_secs(5),
        }
    }

    #[test]
    fn subscription_request_has_the_portal_shape() {
        let request = serde_json::to_value(TradeSubscription::new("MINT123")).unwrap();
        assert_eq!(
            request,
            json!({"method": "subscribeTokenTrade", "keys": ["MINT123"]})
        );
    }

    #[test]
    fn matching_trade_yields_its_market_cap() {
        let text = r#"{"mint":"MINT123","marketCapSol":42.0,"txType":"buy"}"#;
        assert_eq!(market_cap_from_payload(text, "MINT123").unwrap(), Some(42.0));
    }

    #[test]
    fn mismatched_mint_is_ignored() {
        let text = r#"{"mint":"OTHER","marketCapSol":42.0}"#;
        assert_eq!(market_cap_from_payload(text, "MINT123").unwrap(), None);
    }

    #[test]
    fn missing_or_non_numeric_market_cap_is_ignored() {
        assert_eq!(
            market_cap_from_payload(r#"{"mint":"MINT123"}"#, "MINT123").unwrap(),
            None
        );
        assert_eq!(
            market_cap_from_payload(r#"{"mint":"MINT123","marketCapSol":"42"}"#, "MINT123")
                .unwrap(),
            None
        );
    }

    #[test]
    fn subscription_ack_without_mint_is_ignored() {
        let text = r#"{"message":"Successfully subscribed to keys."}"#;
        assert_eq!(market_cap_from_payload(text, "MINT123").unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(market_cap_from_payload("not json", "MINT123").is_err());
    }

    #[test]
    fn api_key_is_appended_to_the_endpoint() {
        let url = config("MINT123", Some("secret-key")).endpoint_url().unwrap();
        assert_eq!(url.as_str(), "wss://pumpportal.fun/api/data?api-key=secret-key");

        let bare = config("MINT123", None).endpoint_url().unwrap();
        assert_eq!(bare.as_str(), "wss://pumpportal.fun/api/data");
    }

    #[tokio::test]
    async fn missing_mint_never_spawns_a_task() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(spawn(config("", None), tx.clone()).is_none());
        assert!(spawn(config(MINT_PLACEHOLDER, None), tx).is_none());
    }
}
