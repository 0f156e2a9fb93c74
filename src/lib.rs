pub mod cli;
pub mod config;
pub mod display;
pub mod events;
pub mod format;
pub mod logging;
pub mod poller;
pub mod stream;
pub mod ui;
pub mod widget;

// Re-export the widget entry points at the root level
pub use widget::{run, run_headless};
