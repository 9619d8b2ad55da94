//! Header Component
//!
//! Displays the backend, the resource tabs and the row counts.

use crate::app::App;
use crate::resource::get_resource;
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" tkino v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(tabs_line(app)), rows[0]);

    // Row 2: backend, counts and capabilities
    let controller = app.current();
    let mut info = vec![
        Span::styled(" Backend: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.client.base_url().to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled("Total: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            controller.total().to_string(),
            Style::default().fg(Color::White),
        ),
    ];
    if !controller.query().is_empty() {
        info.push(Span::styled(
            format!("  Showing: {}", controller.visible_len()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    info.push(Span::raw("  "));
    info.push(Span::styled(
        format!("[{}]", controller.def().capability_hint()),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(info)), rows[1]);

    let help_line = Line::from(vec![
        Span::styled(
            " ?:help  ::cmd  /:filter  Tab:next  a:add  N:notifications  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
        if app.readonly {
            Span::styled(
                "  [READ-ONLY]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(help_line), rows[2]);
}

/// One tab per resource, numbered for the 1-9 shortcuts
fn tabs_line(app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, key) in app.resource_keys.iter().enumerate() {
        let label = get_resource(key)
            .map(|r| r.label.clone())
            .unwrap_or_else(|| key.to_string());
        let style = if *key == app.current_key {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, label), style));
    }
    Line::from(spans)
}
