//! Widget configuration
//!
//! Three knobs matter: the token mint, an optional PumpPortal API key, and
//! the quote poll interval. Everything else (endpoint URLs, log directory)
//! has a sensible default and exists for tests and unusual setups.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

pub const DEFAULT_SOL_PRICE_URL: &str =
    "https://api.binance.com/api/v3/ticker/price?symbol=SOLUSDT";
pub const DEFAULT_STREAM_URL: &str = "wss://pumpportal.fun/api/data";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;

/// Fixed delay between stream reconnection attempts.
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// Environment fallbacks honored when the matching CLI flag is absent.
pub const MINT_ENV: &str = "PUMPCAP_MINT";
pub const API_KEY_ENV: &str = "PUMPCAP_API_KEY";

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Token mint the stream subscription follows. Empty disables streaming.
    pub mint: String,
    /// Optional PumpPortal API key, appended to the stream endpoint.
    pub api_key: Option<String>,
    /// SOL/USDT quote endpoint.
    pub price_url: String,
    /// Trade stream endpoint.
    pub stream_url: String,
    /// Quote poll period.
    pub poll_interval: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            mint: String::new(),
            api_key: None,
            price_url: DEFAULT_SOL_PRICE_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Default log directory under the platform data dir, falling back to a
/// relative `logs/` when the platform dirs cannot be determined.
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("fun", "pumpcap", "pumpcap")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
