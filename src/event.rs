//! Event Handling
//!
//! Keyboard handling for tkino, one handler per [`Mode`].

use crate::app::{App, Mode};
use crate::resource::FieldKind;
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use std::time::Duration;

/// Handle events, returns true if app should quit
pub fn handle_events(app: &mut App) -> Result<bool> {
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            return Ok(handle_key_event(app, key.code, key.modifiers));
        }
    }
    Ok(false)
}

/// Dispatch one key press to the handler of the current mode
pub fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, code, modifiers),
        Mode::Command => handle_command_mode(app, code, modifiers),
        Mode::Help => handle_help_mode(app, code),
        Mode::Form => handle_form_mode(app, code, modifiers),
        Mode::Confirm => handle_confirm_mode(app, code),
        Mode::Warning => handle_warning_mode(app, code),
        Mode::Notifications => handle_notifications_mode(app, code),
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Handle filter input first
    if app.filter_active {
        match code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Enter => app.filter_active = false,
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_filter_char(c);
            }
            _ => {}
        }
        return false;
    }

    // Double-g goes to top
    if code == KeyCode::Char('g') {
        if let Some((KeyCode::Char('g'), time)) = app.last_key_press {
            if time.elapsed() < Duration::from_millis(1000) {
                app.go_to_top();
                app.last_key_press = None;
                return false;
            }
        }
        app.last_key_press = Some((code, std::time::Instant::now()));
        return false;
    }
    app.last_key_press = None;

    match code {
        KeyCode::Char('q') => return true,

        // Navigation - vim style + accessible alternatives
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Home => app.go_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.go_to_bottom(),
        KeyCode::PageDown => app.page_down(10),
        KeyCode::PageUp => app.page_up(10),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => app.page_down(10),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.page_up(10),

        // Resource tabs
        KeyCode::Tab | KeyCode::Char(']') => app.next_resource(),
        KeyCode::BackTab | KeyCode::Char('[') => app.prev_resource(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(n) = c.to_digit(10) {
                app.jump_to_resource(n as usize - 1);
            }
        }

        // Records
        KeyCode::Char('a') | KeyCode::Char('n') => app.open_create(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_selected(),
        KeyCode::Delete | KeyCode::Char('x') => app.request_delete_selected(),
        KeyCode::Char('R') => app.refresh_current(),

        // Filter
        KeyCode::Char('/') => app.filter_active = true,
        KeyCode::Esc => {
            if !app.current().query().is_empty() {
                app.clear_filter();
            } else {
                app.dismiss_toast();
            }
        }

        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Char('?') => app.enter_help_mode(),
        KeyCode::Char('N') => app.enter_notifications_mode(),
        _ => {}
    }
    false
}

fn handle_command_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Enter => return app.execute_command(),
        KeyCode::Backspace => {
            app.command_text.pop();
            app.update_command_suggestions();
        }
        KeyCode::Tab | KeyCode::Right => app.apply_suggestion(),
        KeyCode::Down => app.next_suggestion(),
        KeyCode::Up => app.prev_suggestion(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_text.push(c);
            app.update_command_suggestions();
        }
        _ => {}
    }
    false
}

fn handle_help_mode(app: &mut App, code: KeyCode) -> bool {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter
    ) {
        app.exit_mode();
    }
    false
}

/// Kind of the field that has focus in the open form
fn focused_kind(app: &App) -> Option<FieldKind> {
    let controller = app.current();
    let session = controller.form()?;
    controller
        .def()
        .fields
        .get(session.focus)
        .map(|f| f.kind.clone())
}

fn handle_form_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let kind = focused_kind(app);

    match code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Char('s') if ctrl => app.submit_form(),
        KeyCode::Char('a') if ctrl => app.form_controller().reenable_auto_slug(),
        KeyCode::Tab | KeyCode::Down => app.form_controller().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.form_controller().focus_prev(),
        KeyCode::Enter => match kind {
            Some(FieldKind::Textarea) => app.form_controller().edit_focused(|s| s.push('\n')),
            _ => app.form_controller().focus_next(),
        },
        KeyCode::Left | KeyCode::Right => {
            if matches!(kind, Some(FieldKind::Select { .. })) {
                app.form_controller().cycle_focused(code == KeyCode::Right);
            } else if matches!(kind, Some(FieldKind::Toggle)) {
                app.form_controller().toggle_focused();
            }
        }
        KeyCode::Char(' ') if matches!(kind, Some(FieldKind::Toggle)) => {
            app.form_controller().toggle_focused();
        }
        KeyCode::Backspace => match kind {
            Some(FieldKind::Toggle) => {}
            Some(FieldKind::Select { .. }) => app.form_controller().edit_focused(String::clear),
            _ => app.form_controller().edit_focused(|s| {
                s.pop();
            }),
        },
        KeyCode::Char(c) if !ctrl => {
            if !matches!(kind, Some(FieldKind::Toggle) | Some(FieldKind::Select { .. })) {
                app.form_controller().edit_focused(|s| s.push(c));
            }
        }
        _ => {}
    }
    false
}

fn handle_confirm_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.answer_delete(false),
        KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_delete(true),
        KeyCode::Left | KeyCode::Char('h') => app.confirm_yes = true,
        KeyCode::Right | KeyCode::Char('l') => app.confirm_yes = false,
        KeyCode::Enter => {
            let accepted = app.confirm_yes;
            app.answer_delete(accepted);
        }
        _ => {}
    }
    false
}

fn handle_warning_mode(app: &mut App, code: KeyCode) -> bool {
    if matches!(code, KeyCode::Esc | KeyCode::Enter) {
        app.exit_mode();
    }
    false
}

fn handle_notifications_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Char('c') => app.clear_notifications(),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('N') => app.exit_mode(),
        _ => {}
    }
    false
}
