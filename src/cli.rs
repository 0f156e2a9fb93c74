//! Command-line interface for the market-cap ticker

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{self, WidgetConfig};

#[derive(Parser, Debug)]
#[command(name = "pumpcap")]
#[command(version)]
#[command(about = "Live pump.fun market-cap ticker for the terminal", long_about = None)]
pub struct Cli {
    /// Token mint to follow (falls back to PUMPCAP_MINT)
    #[arg(long)]
    pub mint: Option<String>,

    /// PumpPortal API key (falls back to PUMPCAP_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Quote poll interval in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Quote endpoint override
    #[arg(long, default_value = config::DEFAULT_SOL_PRICE_URL)]
    pub price_url: String,

    /// Trade stream endpoint override
    #[arg(long, default_value = config::DEFAULT_STREAM_URL)]
    pub stream_url: String,

    /// Log directory (default: platform data dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log updates to the console instead of rendering the TUI
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    /// Resolve flags and environment fallbacks into a widget configuration.
    pub fn widget_config(&self) -> WidgetConfig {
        let mint = self
            .mint
            .clone()
            .or_else(|| std::env::var(config::MINT_ENV).ok())
            .unwrap_or_default();
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(config::API_KEY_ENV).ok())
            .filter(|key| !key.is_empty());

        WidgetConfig {
            mint,
            api_key,
            price_url: self.price_url.clone(),
            stream_url: self.stream_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
