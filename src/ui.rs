//! Rendering for the market-cap widget

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::widget::App;

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // The bump cue maps to a short-lived highlight style on the value.
    let value_style = if app.animator.bump_active(Instant::now()) {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let value = Paragraph::new(app.animator.text())
        .style(value_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" MARKET CAP "));
    frame.render_widget(value, chunks[1]);

    let footer = Paragraph::new(status_line(app))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}

fn status_line(app: &App) -> String {
    let sol = if app.state.sol_price_usd > 0.0 {
        format!("SOL ${:.2}", app.state.sol_price_usd)
    } else {
        "SOL price pending".to_string()
    };
    let feed = if app.streaming {
        short_mint(&app.mint)
    } else {
        "stream disabled".to_string()
    };
    format!("{} | {} | q to quit", sol, feed)
}

/// Shorten a base58 mint for the footer.
fn short_mint(mint: &str) -> String {
    if mint.len() <= 12 {
        mint.to_string()
    } else {
        format!("{}...{}", &mint[..6], &mint[mint.len() - 4..])
    }
}
