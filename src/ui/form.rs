//! Form Modal
//!
//! Create/edit modal for the active resource.

use super::centered_rect;
use crate::app::App;
use crate::resource::{FormInput, InputKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let controller = app.current();
    let Some(session) = controller.form() else {
        return;
    };

    let popup_area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, popup_area);

    let title = match session.record_id() {
        Some(id) => format!(" Edit {} #{} ", controller.def().label, id),
        None => format!(" New {} ", controller.def().label),
    };
    let border_color = if session.saving {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            title,
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let mut lines = Vec::new();
    if controller.lookups_loading() {
        lines.push(Line::from(Span::styled(
            "Loading related lists...",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }
    for (i, input) in controller.form_inputs().iter().enumerate() {
        lines.extend(input_lines(input, i == session.focus));
    }

    // Keep the focused field on screen
    let focus_line = lines
        .iter()
        .position(|l| l.style.add_modifier.contains(Modifier::REVERSED))
        .unwrap_or(0);
    let height = chunks[0].height as usize;
    let scroll = focus_line.saturating_sub(height.saturating_sub(3));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    f.render_widget(body, chunks[0]);

    let footer = if session.saving {
        Line::from(Span::styled(
            "Saving...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut spans = vec![
            Span::styled("Ctrl+S", Style::default().fg(Color::Yellow)),
            Span::raw(": save  "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(": next  "),
            Span::styled("←/→", Style::default().fg(Color::Yellow)),
            Span::raw(": choose  "),
        ];
        if controller.def().has_slug() {
            spans.push(Span::styled("Ctrl+A", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(": auto slug  "));
        }
        spans.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(": cancel"));
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(footer), chunks[1]);
}

/// Label line plus value line(s) for one input
fn input_lines(input: &FormInput, focused: bool) -> Vec<Line<'static>> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Gray)
    };
    let value_style = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };

    let mut lines = vec![Line::styled(format!(" {}", input.label), label_style)];

    let placeholder = |value: &str| -> Option<Span<'static>> {
        match (&input.placeholder, value.is_empty()) {
            (Some(p), true) if !focused => Some(Span::styled(
                p.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
            _ => None,
        }
    };

    match &input.kind {
        InputKind::Text { value, multiline } => {
            if let Some(hint) = placeholder(value) {
                lines.push(Line::from(vec![Span::raw("   "), hint]));
            } else if *multiline {
                let mut text_lines: Vec<&str> = value.split('\n').collect();
                let last = text_lines.pop().unwrap_or_default();
                for l in text_lines {
                    lines.push(Line::styled(format!("   {}", l), value_style));
                }
                lines.push(Line::styled(format!("   {}{}", last, cursor), value_style));
            } else {
                lines.push(Line::styled(format!("   {}{}", value, cursor), value_style));
            }
        }
        InputKind::Number { value } => match placeholder(value) {
            Some(hint) => lines.push(Line::from(vec![Span::raw("   "), hint])),
            None => lines.push(Line::styled(format!("   {}{}", value, cursor), value_style)),
        },
        InputKind::Toggle { on } => {
            let (mark, color) = if *on {
                ("[x] Yes", Color::Green)
            } else {
                ("[ ] No", Color::DarkGray)
            };
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(mark, Style::default().fg(color)),
            ]));
        }
        InputKind::Select {
            options,
            selected,
            value,
        } => {
            let shown = match selected.and_then(|i| options.get(i)) {
                Some(option) => option.label.clone(),
                None if value.is_empty() => "(none)".to_string(),
                None => value.clone(),
            };
            let count = if options.is_empty() {
                " (no options)".to_string()
            } else {
                format!(" ({} options)", options.len())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("   ◂ {} ▸", shown), value_style),
                Span::styled(count, Style::default().fg(Color::DarkGray)),
            ]));
        }
        InputKind::Slug { value, auto } => {
            let mode = if *auto { " (auto)" } else { " (manual)" };
            lines.push(Line::from(vec![
                Span::styled(format!("   {}{}", value, cursor), value_style),
                Span::styled(mode, Style::default().fg(Color::DarkGray)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SelectOption;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_select_shows_option_label() {
        let input = FormInput {
            name: "movie_id".into(),
            label: "Movie *".into(),
            kind: InputKind::Select {
                options: vec![SelectOption {
                    id: "7".into(),
                    label: "Qaroqchilar".into(),
                }],
                selected: Some(0),
                value: "7".into(),
            },
            placeholder: None,
        };
        let lines = text_of(&input_lines(&input, false));
        assert_eq!(lines[0], " Movie *");
        assert!(lines[1].contains("Qaroqchilar"));
    }

    #[test]
    fn test_multiline_cursor_on_last_line() {
        let input = FormInput {
            name: "biography".into(),
            label: "Biography".into(),
            kind: InputKind::Text {
                value: "line one\nline two".into(),
                multiline: true,
            },
            placeholder: None,
        };
        let lines = text_of(&input_lines(&input, true));
        assert_eq!(lines[1], "   line one");
        assert_eq!(lines[2], "   line two_");
    }

    #[test]
    fn test_placeholder_only_when_unfocused_and_empty() {
        let input = FormInput {
            name: "country".into(),
            label: "Country".into(),
            kind: InputKind::Text {
                value: String::new(),
                multiline: false,
            },
            placeholder: Some("Uzbekistan".into()),
        };
        assert!(text_of(&input_lines(&input, false))[1].contains("Uzbekistan"));
        assert_eq!(text_of(&input_lines(&input, true))[1], "   _");
    }
}
