//! Help Overlay
//!
//! Shows keyboard shortcuts.

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, ↑/↓", "Move up/down"),
            ("gg / G", "Go to top/bottom"),
            ("Ctrl+d/u", "Page down/up"),
            ("Tab, ]/[", "Next/previous resource"),
            ("1-9", "Jump to resource"),
        ],
    ),
    (
        "Records",
        &[
            ("a", "Add record"),
            ("e, Enter", "Edit selected"),
            ("x, Del", "Delete selected"),
            ("R", "Refresh list"),
            ("/", "Filter (Esc clears)"),
            ("Esc", "Dismiss message"),
        ],
    ),
    (
        "Form",
        &[
            ("Tab/Shift+Tab", "Next/previous field"),
            ("←/→, Space", "Choose option / toggle"),
            ("Ctrl+A", "Derive slug again"),
            ("Ctrl+S", "Save"),
            ("Esc", "Cancel"),
        ],
    ),
    (
        "Other",
        &[
            (":", "Command mode"),
            ("N", "Notification history"),
            ("?/Esc", "Close help"),
            ("q", "Quit"),
        ],
    ),
];

pub fn render(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 85, f.area());
    f.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (title, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            *title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }

    if app.readonly {
        help_text.push(Line::from(Span::styled(
            "Read-only mode: add, edit and delete are disabled",
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, popup_area);
}
