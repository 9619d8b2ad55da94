//! Splash Screen
//!
//! Loading screen shown while the config is read and the first list loads.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Startup steps: config, client, first list
const TOTAL_STEPS: usize = 3;

/// Splash screen state
pub struct SplashState {
    message: String,
    completed_steps: usize,
}

impl SplashState {
    pub fn new() -> Self {
        Self {
            message: "Initializing...".to_string(),
            completed_steps: 0,
        }
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    pub fn complete_step(&mut self) {
        self.completed_steps = (self.completed_steps + 1).min(TOTAL_STEPS);
    }

    fn percent(&self) -> u16 {
        (self.completed_steps * 100 / TOTAL_STEPS) as u16
    }
}

impl Default for SplashState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(f: &mut Frame, state: &SplashState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(10),
            Constraint::Percentage(35),
        ])
        .split(f.area());

    let center = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(chunks[1])[1];

    let logo_style = Style::default().fg(Color::Cyan);
    let logo = vec![
        Line::from(Span::styled(" _   _    _             ", logo_style)),
        Line::from(Span::styled("| |_| | _(_)_ __   ___  ", logo_style)),
        Line::from(Span::styled("| __| |/ / | '_ \\ / _ \\ ", logo_style)),
        Line::from(Span::styled("| |_|   <| | | | | (_) |", logo_style)),
        Line::from(Span::styled(" \\__|_|\\_\\_|_| |_|\\___/ ", logo_style)),
        Line::from(""),
        Line::from(Span::styled(
            "Movie catalogue admin console",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let logo_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = logo_block.inner(center);
    f.render_widget(logo_block, center);

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    f.render_widget(
        Paragraph::new(logo).alignment(Alignment::Center),
        inner_chunks[0],
    );

    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(state.percent())
        .label(Span::styled(
            state.message.clone(),
            Style::default().fg(Color::White),
        ));

    f.render_widget(progress, inner_chunks[1]);
}
