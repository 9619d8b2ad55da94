//! Terminal User Interface rendering module
//!
//! This module handles all UI rendering for tkino using the ratatui framework.
//! The active resource is shown as a table with vim-style navigation and the
//! modal views are drawn as overlays on top of it.
//!
//! # Architecture
//!
//! - [`splash`] - Startup splash screen
//! - `header` - Header bar with backend, tabs and counts
//! - `help` - Help overlay showing keybindings
//! - `dialog` - Delete confirmation and warning dialogs
//! - `form` - Create/edit modal
//! - `command_box` - Command mode input (`:` key)
//! - `notifications` - Notification history panel
//!
//! # Virtual Scrolling
//!
//! Only the visible rows are built into the table, with a scrollbar
//! indicating position.

mod command_box;
mod dialog;
mod form;
mod header;
mod help;
mod notifications;
pub mod splash;

use crate::app::{App, Mode};
use crate::controller::LoadState;
use crate::notification::NoticeKind;
use crate::resource::{get_color_for_value, render_cell, ColumnDef};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header (multi-line)
            Constraint::Min(1),    // Table
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);
    render_main_content(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);

    // Overlays
    match app.mode {
        Mode::Help => help::render(f, app),
        Mode::Form => form::render(f, app),
        Mode::Confirm | Mode::Warning => dialog::render(f, app),
        Mode::Command => command_box::render(f, app),
        Mode::Notifications => notifications::render(f, app),
        Mode::Normal => {}
    }
}

fn render_main_content(f: &mut Frame, app: &mut App, area: Rect) {
    let show_filter = app.filter_active || !app.current().query().is_empty();

    if show_filter {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_filter_bar(f, app, chunks[0]);
        render_table(f, app, chunks[1]);
    } else {
        render_table(f, app, area);
    }
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor_style = if app.filter_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let query = app.current().query();
    let filter_display = if app.filter_active {
        format!("/{}_", query)
    } else {
        format!("/{}", query)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(filter_display, cursor_style)]));
    f.render_widget(paragraph, area);
}

/// Placeholder shown instead of rows
fn status_message(app: &App) -> Option<(String, Style)> {
    let controller = app.current();
    if let LoadState::Failed(message) = controller.load_state() {
        return Some((
            format!("Load failed: {}", message),
            Style::default().fg(Color::Red),
        ));
    }
    if controller.visible_len() > 0 {
        return None;
    }
    if controller.is_fetching() {
        return Some(("Loading...".to_string(), Style::default().fg(Color::Yellow)));
    }
    let text = if controller.total() > 0 {
        format!("No {} match \"{}\"", controller.def().label, controller.query())
    } else if *controller.load_state() == LoadState::Idle {
        String::new()
    } else {
        format!("No {} yet. Press 'a' to add one.", controller.def().label)
    };
    Some((text, Style::default().fg(Color::DarkGray)))
}

/// Render the current resource as a table.
/// Uses virtual scrolling for performance with large datasets
fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let title = {
        let controller = app.current();
        let count = controller.visible_len();
        let total = controller.total();
        let syncing = if controller.is_fetching() { " ↻" } else { "" };
        if controller.query().is_empty() {
            format!(" {}[{}]{} ", controller.def().label, count, syncing)
        } else {
            format!(" {}[{}/{}]{} ", controller.def().label, count, total, syncing)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    if let Some((message, style)) = status_message(app) {
        let paragraph = Paragraph::new(message)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, inner_area);
        return;
    }

    // Account for header row
    let visible_height = (inner_area.height as usize).saturating_sub(1);
    app.update_viewport(visible_height);

    let controller = app.current();
    let total_items = controller.visible_len();
    let needs_scrollbar = total_items > visible_height;

    let table_area = if needs_scrollbar {
        Rect {
            width: inner_area.width.saturating_sub(1),
            ..inner_area
        }
    } else {
        inner_area
    };

    let range = app.visible_range();
    let def = controller.def();
    let lookups = controller.lookups();

    let header_cells: Vec<Cell> = def
        .columns
        .iter()
        .map(|col| {
            Cell::from(format!(" {}", col.header)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    // Only build visible rows
    let rows: Vec<Row> = controller
        .visible_rows()
        .skip(range.start)
        .take(range.len())
        .map(|row| {
            let cells = def.columns.iter().map(|col| {
                let text = render_cell(col, row, lookups);
                let style = cell_style(&text, col);
                Cell::from(format!(" {}", truncate_string(&text, 38))).style(style)
            });
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect();

    let widths: Vec<Constraint> = def
        .columns
        .iter()
        .map(|col| Constraint::Percentage(col.width))
        .collect();

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    let selected = controller.selected();
    if range.contains(&selected) {
        state.select(Some(selected - range.start));
    }

    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_items.saturating_sub(visible_height))
            .position(app.scroll_offset);

        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Get cell style from the column's color map
fn cell_style(value: &str, col: &ColumnDef) -> Style {
    if let Some(ref color_map_name) = col.color_map {
        if let Some([r, g, b]) = get_color_for_value(color_map_name, value) {
            return Style::default().fg(Color::Rgb(r, g, b));
        }
    }
    Style::default()
}

/// Truncate string for display (Unicode-safe)
fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

fn toast_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Success => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        NoticeKind::Info => Style::default().fg(Color::Cyan),
    }
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let controller = app.current();

    let (status_text, style) = if let Some(toast) = app.current_toast() {
        (toast.toast_line(), toast_style(toast.kind))
    } else if controller.is_deleting() {
        ("Deleting...".to_string(), Style::default().fg(Color::Yellow))
    } else if !controller.is_consistent() {
        ("Syncing...".to_string(), Style::default().fg(Color::Yellow))
    } else if app.filter_active {
        (
            "Type to filter | Enter: apply | Esc: clear".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "a:add  e:edit  x:delete  R:refresh  /:filter  ?:help".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let indicator = {
        let errors = app.history.error_count();
        if app.in_flight() > 0 {
            format!(" [↻{}]", app.in_flight())
        } else if errors > 0 {
            format!(" [N:{}✗]", errors)
        } else if !app.history.is_empty() {
            " [N]".to_string()
        } else {
            String::new()
        }
    };

    let indicator_style = if app.in_flight() > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let crumb = Line::from(vec![
        Span::styled(
            format!("<{}>", controller.key()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(status_text, style),
        Span::styled(indicator, indicator_style),
    ]);

    f.render_widget(Paragraph::new(crumb), area);
}

/// Center a popup of the given percentage size inside `r`
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::Config;
    use crate::controller::{Request, Response};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::time::Duration;

    fn app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        App::new(client, Config::default(), false, "genre").unwrap()
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn load(app: &mut App, rows: serde_json::Value) {
        let requests = app.form_controller().refresh();
        let seq = match &requests[0] {
            Request::FetchList { seq, .. } => *seq,
            other => panic!("unexpected {:?}", other),
        };
        app.form_controller().apply(Response::ListFetched {
            resource: "genre".into(),
            seq,
            result: Ok(rows),
        });
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_string("ёжикёжикёжик", 6), "ёжи...");
    }

    #[test]
    fn test_rows_render_with_yes_no_cells() {
        let mut app = app();
        load(
            &mut app,
            json!([{"id": 1, "name_uz": "Drama", "slug": "drama", "is_active": true}]),
        );
        let text = screen(&mut app);
        assert!(text.contains("Drama"));
        assert!(text.contains("Yes"));
    }

    #[test]
    fn test_empty_and_failed_states() {
        let mut app = app();
        load(&mut app, json!([]));
        assert!(screen(&mut app).contains("No Genres yet"));

        let requests = app.form_controller().refresh();
        let seq = match &requests[0] {
            Request::FetchList { seq, .. } => *seq,
            other => panic!("unexpected {:?}", other),
        };
        app.form_controller().apply(Response::ListFetched {
            resource: "genre".into(),
            seq,
            result: Err(crate::api::ApiError::Transport("connection refused".into())),
        });
        assert!(screen(&mut app).contains("Load failed: connection refused"));
    }
}
