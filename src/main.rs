use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use pumpcap::cli::Cli;
use pumpcap::config;
use pumpcap::logging::{self, init_logging, LogMode, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let widget_config = cli.widget_config();

    let log_dir = cli.log_dir.clone().unwrap_or_else(config::default_log_dir);
    let mode = if cli.headless {
        LogMode::ConsoleAndFile
    } else {
        LogMode::FileOnly
    };
    let logging_config = LoggingConfig::new(mode, log_dir);

    if !cli.headless {
        // Console banner before the TUI takes the screen.
        println!("\n{}", "pumpcap live market-cap ticker".bold());
        if widget_config.mint.is_empty() {
            println!(
                "   {} no mint configured, trade stream disabled (set --mint or {})",
                "!".yellow(),
                config::MINT_ENV
            );
        } else {
            println!("   mint: {}", widget_config.mint.green());
        }
        println!("   logs: {}", logging_config.log_file_path().display());
    }

    init_logging(logging_config)?;

    let result = if cli.headless {
        pumpcap::run_headless(widget_config).await
    } else {
        pumpcap::run(widget_config).await
    };

    match result {
        Ok(()) => {
            logging::log_session_end();
            Ok(())
        }
        Err(e) => {
            tracing::error!("Application error: {}", e);

            let mut source = e.source();
            while let Some(err) = source {
                tracing::error!("   Caused by: {}", err);
                source = err.source();
            }

            logging::log_session_end();
            Err(e)
        }
    }
}
