//! Widget controller: owns the shared market state and drives the display
//!
//! The poller and stream tasks never touch state directly. They push
//! `MarketUpdate`s through a channel, and the controller loop applies them in
//! arrival order, recomputes the USD figure, and animates the display toward
//! it. Latest value wins on both sides.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{WidgetConfig, RECONNECT_DELAY_MS};
use crate::display::DisplayAnimator;
use crate::events::{Event, EventHandler};
use crate::format::format_market_cap_usd;
use crate::poller::{self, PollerConfig};
use crate::stream::{self, StreamConfig};
use crate::ui;

/// Time between animation frames, well under the transition duration.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// A state update produced by one of the feed tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketUpdate {
    /// Fresh SOL/USD quote from the poller.
    SolPrice(f64),
    /// Market cap in SOL reported by a trade.
    MarketCapSol(f64),
}

/// The two shared scalars. `0.0` means unknown; a USD figure exists only
/// once both are known.
#[derive(Debug, Default)]
pub struct MarketState {
    pub sol_price_usd: f64,
    pub latest_market_cap_sol: f64,
}

impl MarketState {
    /// Apply an update and return the new USD market cap when both inputs
    /// are known.
    pub fn apply(&mut self, update: MarketUpdate) -> Option<f64> {
        match update {
            MarketUpdate::SolPrice(price) => self.sol_price_usd = price,
            MarketUpdate::MarketCapSol(cap) => self.latest_market_cap_sol = cap,
        }
        self.market_cap_usd()
    }

    /// The USD product, or `None` while either side is still unknown.
    pub fn market_cap_usd(&self) -> Option<f64> {
        if self.sol_price_usd > 0.0 && self.latest_market_cap_sol > 0.0 {
            Some(self.latest_market_cap_sol * self.sol_price_usd)
        } else {
            None
        }
    }
}

/// Controller state shared between the update handlers and the renderer.
pub struct App {
    pub state: MarketState,
    pub animator: DisplayAnimator,
    pub mint: String,
    pub streaming: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(mint: String, streaming: bool) -> Self {
        Self {
            state: MarketState::default(),
            animator: DisplayAnimator::new(),
            mint,
            streaming,
            should_quit: false,
        }
    }

    /// Apply one update, retargeting the display when a USD figure exists.
    pub fn handle_update(&mut self, update: MarketUpdate, now: Instant) {
        if let Some(target) = self.state.apply(update) {
            self.animator.set_target(target, now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                info!("User requested quit");
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                info!("User requested quit");
                self.should_quit = true;
            }
            _ => {}
        }
    }
}

struct FeedHandles {
    poller: JoinHandle<()>,
    stream: Option<JoinHandle<()>>,
}

impl FeedHandles {
    fn abort_all(&self) {
        self.poller.abort();
        if let Some(stream) = &self.stream {
            stream.abort();
        }
    }
}

/// Spawn both feed tasks wired to a fresh update channel.
fn start_feeds(config: &WidgetConfig) -> (App, mpsc::UnboundedReceiver<MarketUpdate>, FeedHandles) {
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();

    let poller = poller::spawn(
        PollerConfig {
            url: config.price_url.clone(),
            interval: config.poll_interval,
        },
        updates_tx.clone(),
    );

    let stream = stream::spawn(
        StreamConfig {
            endpoint: config.stream_url.clone(),
            mint: config.mint.clone(),
            api_key: config.api_key.clone(),
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
        },
        updates_tx,
    );

    let app = App::new(config.mint.clone(), stream.is_some());
    (app, updates_rx, FeedHandles { poller, stream })
}

/// Initialize state, start both feeds, and run the TUI until the user quits.
pub async fn run(config: WidgetConfig) -> Result<()> {
    let (app, updates_rx, handles) = start_feeds(&config);
    let result = run_tui(app, updates_rx).await;
    handles.abort_all();
    result
}

async fn run_tui(mut app: App, mut updates: mpsc::UnboundedReceiver<MarketUpdate>) -> Result<()> {
    // Restore the terminal even when the loop panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_handler = EventHandler::new(FRAME_INTERVAL);

    info!("starting widget main loop");
    let result = loop {
        if app.should_quit {
            break Ok(());
        }

        tokio::select! {
            update = updates.recv() => {
                match update {
                    Some(update) => app.handle_update(update, Instant::now()),
                    None => break Err(anyhow!("all feed tasks stopped unexpectedly")),
                }
            }
            input = event_handler.next() => {
                match input {
                    Some(Event::Key(key)) => app.handle_key(key),
                    Some(Event::Tick) => {
                        app.animator.tick(Instant::now());
                        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &app)) {
                            break Err(anyhow!("terminal drawing failed: {}", e));
                        }
                    }
                    Some(Event::Error(msg)) => warn!("terminal input error: {}", msg),
                    None => break Err(anyhow!("input event handler stopped unexpectedly")),
                }
            }
        }
    };

    restore_terminal(&mut terminal)?;
    result
}

/// Initialize state, start both feeds, and log recomputed values instead of
/// rendering. For terminals the TUI cannot own (CI, piped output).
pub async fn run_headless(config: WidgetConfig) -> Result<()> {
    let (mut app, mut updates, handles) = start_feeds(&config);

    info!("running headless, ctrl-c to stop");
    let result = loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Some(update) => {
                        app.handle_update(update, Instant::now());
                        if let Some(usd) = app.state.market_cap_usd() {
                            info!(
                                market_cap_usd = usd,
                                display = %format_market_cap_usd(usd),
                                "market cap updated"
                            );
                        }
                    }
                    None => break Err(anyhow!("all feed tasks stopped unexpectedly")),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break Ok(());
            }
        }
    };

    handles.abort_all();
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    use std::io::IsTerminal;

    if !io::stdout().is_terminal() {
        return Err(anyhow!("stdout is not a terminal (try --headless)"));
    }

    enable_raw_mode().map_err(|e| anyhow!("Failed to enable raw mode: {}", e))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| anyhow!("Failed to setup terminal screen: {}", e))?;

    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
