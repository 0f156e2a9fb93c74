//! Terminal input and frame ticks for the widget loop

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

/// Events the widget loop reacts to besides market updates: keys from the
/// terminal and the frame tick that drives the animator.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Error(String),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let _task = tokio::spawn(async move {
            let mut frames = tokio::time::interval(tick_rate);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                frames.tick().await;

                // Drain pending terminal input ahead of the frame tick so
                // key presses are never stuck behind a redraw.
                loop {
                    match event::poll(Duration::ZERO) {
                        Ok(true) => match event::read() {
                            Ok(CrosstermEvent::Key(key)) => {
                                if tx.send(Event::Key(key)).is_err() {
                                    debug!("event channel closed, stopping input handler");
                                    return;
                                }
                            }
                            Ok(_) => {
                                // Ignore other event types
                            }
                            Err(e) => {
                                error!("Failed to read terminal event: {}", e);
                                let _ = tx.send(Event::Error(format!("Terminal read error: {}", e)));
                            }
                        },
                        Ok(false) => break,
                        Err(e) => {
                            error!("Failed to poll terminal events: {}", e);
                            break;
                        }
                    }
                }

                if tx.send(Event::Tick).is_err() {
                    debug!("event channel closed, stopping tick handler");
                    return;
                }
            }
        });

        Self { rx, _task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
