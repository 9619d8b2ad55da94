//! Application State
//!
//! Central application state for tkino: one cached controller per resource,
//! the active tab, the current input mode and the channel that brings
//! finished requests back from their tokio tasks.

use crate::api::ApiClient;
use crate::config::Config;
use crate::controller::{Request, ResourceController, Response};
use crate::notification::{Notice, NotificationHistory};
use crate::resource::{get_all_resource_keys, get_resource};
use anyhow::{anyhow, Result};
use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::ops::Range;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// =========================================================================
// Configuration Constants
// =========================================================================

/// Default viewport height (will be updated during render based on terminal size)
const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/// Commands offered in `:` mode besides the resource keys
const BUILTIN_COMMANDS: &[&str] = &["refresh", "new", "notifications", "notifications clear", "q"];

/// Application modes
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,        // Viewing list
    Command,       // : command input
    Help,          // ? help popup
    Form,          // Create/edit modal
    Confirm,       // Delete confirmation
    Warning,       // Warning/info dialog (OK only)
    Notifications, // Notifications history panel
}

/// Main application state
pub struct App {
    pub client: ApiClient,

    // One controller per resource key, kept across tab switches
    controllers: HashMap<String, ResourceController>,
    pub resource_keys: Vec<&'static str>,
    pub current_key: String,

    pub mode: Mode,
    pub filter_active: bool,

    // Command input
    pub command_text: String,
    pub command_suggestions: Vec<String>,
    pub command_suggestion_selected: usize,
    pub command_preview: Option<String>,

    // Confirmation dialog: which button is highlighted
    pub confirm_yes: bool,

    // Persistent configuration
    pub config: Config,

    // Key press tracking
    pub last_key_press: Option<(KeyCode, std::time::Instant)>,

    // Read-only mode
    pub readonly: bool,

    // Warning message
    pub warning_message: Option<String>,

    // Notifications
    pub history: NotificationHistory,
    pub notifications_selected: usize,

    // Virtual scrolling
    pub viewport_height: usize,
    pub scroll_offset: usize,

    // Finished requests flow back here
    tx: UnboundedSender<Response>,
    rx: UnboundedReceiver<Response>,
    in_flight: usize,
}

impl App {
    /// Build the app with every controller created up front. Nothing is
    /// fetched until [`switch_to`](Self::switch_to) or a refresh.
    pub fn new(client: ApiClient, config: Config, readonly: bool, initial_key: &str) -> Result<Self> {
        let resource_keys = get_all_resource_keys();
        let toast_duration = config.toast_duration();
        let mut controllers = HashMap::new();
        for key in &resource_keys {
            let def = get_resource(key).ok_or_else(|| anyhow!("Unknown resource: {}", key))?;
            controllers.insert(
                key.to_string(),
                ResourceController::new(def.clone()).with_toast_duration(toast_duration),
            );
        }
        if !controllers.contains_key(initial_key) {
            return Err(anyhow!(
                "Unknown resource '{}'. Available: {}",
                initial_key,
                resource_keys.join(", ")
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            client,
            controllers,
            resource_keys,
            current_key: initial_key.to_string(),
            mode: Mode::Normal,
            filter_active: false,
            command_text: String::new(),
            command_suggestions: Vec::new(),
            command_suggestion_selected: 0,
            command_preview: None,
            confirm_yes: false,
            config,
            last_key_press: None,
            readonly,
            warning_message: None,
            history: NotificationHistory::default(),
            notifications_selected: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_offset: 0,
            tx,
            rx,
            in_flight: 0,
        })
    }

    pub fn current(&self) -> &ResourceController {
        &self.controllers[&self.current_key]
    }

    fn current_mut(&mut self) -> &mut ResourceController {
        self.controllers
            .get_mut(&self.current_key)
            .unwrap_or_else(|| unreachable!("current key is always a known resource"))
    }

    pub fn controller(&self, key: &str) -> Option<&ResourceController> {
        self.controllers.get(key)
    }

    /// Position of the active tab
    pub fn current_index(&self) -> usize {
        self.resource_keys
            .iter()
            .position(|k| *k == self.current_key)
            .unwrap_or(0)
    }

    /// Number of requests not answered yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // =========================================================================
    // Requests and responses
    // =========================================================================

    /// Run requests on tokio tasks; results arrive through the channel
    pub fn dispatch(&mut self, requests: Vec<Request>) {
        for request in requests {
            tracing::debug!("[{}] {}", request.resource(), request.describe());
            let client = self.client.clone();
            let tx = self.tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let response = request.execute(&client).await;
                // Receiver only goes away on shutdown
                let _ = tx.send(response);
            });
        }
    }

    /// Route one response to its controller, whichever tab is active
    pub fn handle_response(&mut self, response: Response) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let key = response.resource().to_string();
        let Some(controller) = self.controllers.get_mut(&key) else {
            tracing::warn!("Response for unknown resource {}", key);
            return;
        };
        let follow_up = controller.apply(response);
        self.dispatch(follow_up);
        self.record_notices();
        self.sync_mode();
        self.ensure_visible();
    }

    /// Apply every response that has already arrived. Returns true if any did.
    pub fn drain_responses(&mut self) -> bool {
        let mut any = false;
        while let Ok(response) = self.rx.try_recv() {
            self.handle_response(response);
            any = true;
        }
        any
    }

    /// Wait for the next response and apply it
    pub async fn next_response(&mut self) -> Option<()> {
        let response = self.rx.recv().await?;
        self.handle_response(response);
        Some(())
    }

    /// Copy freshly shown toasts into the history panel
    fn record_notices(&mut self) {
        for (key, controller) in self.controllers.iter_mut() {
            if let Some(notice) = controller.notifications_mut().take_unrecorded() {
                self.history.record(key, notice);
            }
        }
    }

    /// Leave modal modes whose controller state has gone away
    fn sync_mode(&mut self) {
        let controller = self.current();
        let stale = match self.mode {
            Mode::Form => controller.form().is_none(),
            Mode::Confirm => controller.delete_prompt().is_none(),
            _ => false,
        };
        if stale {
            self.mode = Mode::Normal;
        }
    }

    /// Toast visible in the footer for the active resource
    pub fn current_toast(&self) -> Option<&Notice> {
        self.current().notifications().current()
    }

    pub fn dismiss_toast(&mut self) {
        self.current_mut().notifications_mut().dismiss();
    }

    // =========================================================================
    // Resource switching
    // =========================================================================

    /// Make `key` the active tab and refetch it; the cached list stays
    /// visible until the new one arrives.
    pub fn switch_to(&mut self, key: &str) -> Result<()> {
        if !self.controllers.contains_key(key) {
            return Err(anyhow!("Unknown resource: {}", key));
        }
        self.current_key = key.to_string();
        self.filter_active = false;
        self.scroll_offset = 0;
        self.refresh_current();
        if let Err(e) = self.config.set_last_resource(key) {
            tracing::warn!("Failed to save last resource to config: {}", e);
        }
        Ok(())
    }

    pub fn next_resource(&mut self) {
        let next = (self.current_index() + 1) % self.resource_keys.len();
        let key = self.resource_keys[next];
        let _ = self.switch_to(key);
    }

    pub fn prev_resource(&mut self) {
        let len = self.resource_keys.len();
        let prev = (self.current_index() + len - 1) % len;
        let key = self.resource_keys[prev];
        let _ = self.switch_to(key);
    }

    /// Jump to the n-th tab (0-based)
    pub fn jump_to_resource(&mut self, index: usize) {
        if let Some(key) = self.resource_keys.get(index).copied() {
            let _ = self.switch_to(key);
        }
    }

    pub fn refresh_current(&mut self) {
        let requests = self.current_mut().refresh();
        self.dispatch(requests);
    }

    // =========================================================================
    // Record operations
    // =========================================================================

    fn block_if_readonly(&mut self, action: &str) -> bool {
        if self.readonly {
            self.show_warning(&format!(
                "Read-only mode: {} is disabled.\n\nRestart without --readonly to make changes.",
                action
            ));
        }
        self.readonly
    }

    pub fn open_create(&mut self) {
        if self.block_if_readonly("create") {
            return;
        }
        self.current_mut().open_create();
        self.mode = Mode::Form;
    }

    pub fn open_edit_selected(&mut self) {
        if self.block_if_readonly("edit") {
            return;
        }
        let Some(index) = self.current().selected_row_index() else {
            return;
        };
        if self.current_mut().open_edit(index) {
            self.mode = Mode::Form;
        }
        self.record_notices();
    }

    pub fn request_delete_selected(&mut self) {
        if self.block_if_readonly("delete") {
            return;
        }
        let Some(index) = self.current().selected_row_index() else {
            return;
        };
        if self.current_mut().request_delete(index) {
            self.confirm_yes = false;
            self.mode = Mode::Confirm;
        }
        self.record_notices();
    }

    /// Answer the delete prompt
    pub fn answer_delete(&mut self, accepted: bool) {
        let request = self.current_mut().confirm_delete(accepted);
        self.dispatch(request.into_iter().collect());
        self.mode = Mode::Normal;
    }

    pub fn submit_form(&mut self) {
        let request = self.current_mut().submit();
        self.dispatch(request.into_iter().collect());
        self.record_notices();
    }

    /// Esc in the form; ignored while the save is in flight
    pub fn cancel_form(&mut self) {
        if self.current_mut().close_form() {
            self.mode = Mode::Normal;
        }
    }

    /// Mutable access to the active controller for form editing keys
    pub fn form_controller(&mut self) -> &mut ResourceController {
        self.current_mut()
    }

    // =========================================================================
    // Filter
    // =========================================================================

    pub fn push_filter_char(&mut self, c: char) {
        self.current_mut().push_query_char(c);
        self.scroll_offset = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.current_mut().pop_query_char();
        self.scroll_offset = 0;
    }

    pub fn clear_filter(&mut self) {
        self.current_mut().set_query("");
        self.filter_active = false;
        self.scroll_offset = 0;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn next(&mut self) {
        match self.mode {
            Mode::Notifications => {
                if self.notifications_selected + 1 < self.history.len() {
                    self.notifications_selected += 1;
                }
            }
            Mode::Command => self.next_suggestion(),
            _ => self.current_mut().select_next(),
        }
        self.ensure_visible();
    }

    pub fn previous(&mut self) {
        match self.mode {
            Mode::Notifications => {
                self.notifications_selected = self.notifications_selected.saturating_sub(1);
            }
            Mode::Command => self.prev_suggestion(),
            _ => self.current_mut().select_prev(),
        }
        self.ensure_visible();
    }

    pub fn go_to_top(&mut self) {
        match self.mode {
            Mode::Notifications => self.notifications_selected = 0,
            _ => self.current_mut().select_first(),
        }
        self.ensure_visible();
    }

    pub fn go_to_bottom(&mut self) {
        match self.mode {
            Mode::Notifications => {
                self.notifications_selected = self.history.len().saturating_sub(1);
            }
            _ => self.current_mut().select_last(),
        }
        self.ensure_visible();
    }

    pub fn page_down(&mut self, page_size: usize) {
        self.current_mut().page_down(page_size);
        self.ensure_visible();
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.current_mut().page_up(page_size);
        self.ensure_visible();
    }

    // =========================================================================
    // Mode Transitions
    // =========================================================================

    pub fn get_available_commands(&self) -> Vec<String> {
        self.resource_keys
            .iter()
            .map(|k| k.to_string())
            .chain(BUILTIN_COMMANDS.iter().map(|c| c.to_string()))
            .collect()
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_text.clear();
        self.command_suggestions = self.get_available_commands();
        self.command_suggestion_selected = 0;
        self.command_preview = None;
    }

    pub fn update_command_suggestions(&mut self) {
        let input = self.command_text.to_lowercase();
        let all_commands = self.get_available_commands();

        if input.is_empty() {
            self.command_suggestions = all_commands;
        } else {
            self.command_suggestions = all_commands
                .into_iter()
                .filter(|cmd| cmd.contains(&input))
                .collect();
        }

        if self.command_suggestion_selected >= self.command_suggestions.len() {
            self.command_suggestion_selected = 0;
        }

        self.update_preview();
    }

    fn update_preview(&mut self) {
        self.command_preview = self
            .command_suggestions
            .get(self.command_suggestion_selected)
            .cloned();
    }

    pub fn next_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            self.command_suggestion_selected =
                (self.command_suggestion_selected + 1) % self.command_suggestions.len();
            self.update_preview();
        }
    }

    pub fn prev_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            if self.command_suggestion_selected == 0 {
                self.command_suggestion_selected = self.command_suggestions.len() - 1;
            } else {
                self.command_suggestion_selected -= 1;
            }
            self.update_preview();
        }
    }

    pub fn apply_suggestion(&mut self) {
        if let Some(preview) = &self.command_preview {
            self.command_text = preview.clone();
            self.update_command_suggestions();
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn enter_notifications_mode(&mut self) {
        self.notifications_selected = 0;
        self.mode = Mode::Notifications;
    }

    pub fn clear_notifications(&mut self) {
        self.history.clear();
        self.notifications_selected = 0;
    }

    pub fn show_warning(&mut self, message: &str) {
        self.warning_message = Some(message.to_string());
        self.mode = Mode::Warning;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.warning_message = None;
    }

    // =========================================================================
    // Command Execution
    // =========================================================================

    /// Run the text typed in `:` mode. Returns true when the app should quit.
    pub fn execute_command(&mut self) -> bool {
        let command_text = if self.command_text.is_empty() {
            self.command_preview.clone().unwrap_or_default()
        } else if let Some(preview) = &self.command_preview {
            if preview.contains(&self.command_text) {
                preview.clone()
            } else {
                self.command_text.clone()
            }
        } else {
            self.command_text.clone()
        };

        self.mode = Mode::Normal;
        let parts: Vec<&str> = command_text.split_whitespace().collect();
        let Some(&cmd) = parts.first() else {
            return false;
        };

        match cmd {
            "q" | "quit" => return true,
            "refresh" => self.refresh_current(),
            "new" => self.open_create(),
            "notifications" => {
                if parts.get(1) == Some(&"clear") {
                    self.clear_notifications();
                } else {
                    self.enter_notifications_mode();
                }
            }
            key => {
                if self.switch_to(key).is_err() {
                    self.show_warning(&format!("Unknown command: {}", key));
                }
            }
        }
        false
    }

    // =========================================================================
    // Virtual Scrolling
    // =========================================================================

    /// Update the viewport height (called from UI during render)
    pub fn update_viewport(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.ensure_visible();
    }

    /// Ensure the selected item is visible in the viewport
    pub fn ensure_visible(&mut self) {
        let len = self.current().visible_len();
        if len == 0 {
            self.scroll_offset = 0;
            return;
        }

        let selected = self.current().selected();
        let visible_height = self.viewport_height;
        let margin = 2; // Keep cursor at least this far from edge

        if selected < self.scroll_offset + margin {
            self.scroll_offset = selected.saturating_sub(margin);
        } else if selected >= self.scroll_offset + visible_height.saturating_sub(margin) {
            self.scroll_offset = selected.saturating_sub(visible_height.saturating_sub(margin + 1));
        }

        let max_offset = len.saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Get the range of visible items based on scroll offset and viewport
    pub fn visible_range(&self) -> Range<usize> {
        let len = self.current().visible_len();
        let start = self.scroll_offset.min(len);
        let end = (self.scroll_offset + self.viewport_height).min(len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        App::new(client, Config::default(), false, "actor").unwrap()
    }

    fn load_rows(app: &mut App, count: usize) {
        let rows: Vec<_> = (0..count)
            .map(|i| json!({"id": i, "full_name": format!("Actor {}", i)}))
            .collect();
        let seq = match app.current_mut().refresh().remove(0) {
            Request::FetchList { seq, .. } => seq,
            other => panic!("unexpected {:?}", other),
        };
        app.current_mut().apply(Response::ListFetched {
            resource: "actor".into(),
            seq,
            result: Ok(json!(rows)),
        });
    }

    #[test]
    fn test_unknown_initial_resource_is_rejected() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(App::new(client, Config::default(), false, "studios").is_err());
    }

    #[test]
    fn test_command_suggestions_include_resources_and_builtins() {
        let mut app = app();
        app.enter_command_mode();
        app.command_text = "movie_".into();
        app.update_command_suggestions();
        assert_eq!(
            app.command_suggestions,
            vec!["movie_actor", "movie_category", "movie_director", "movie_genre"]
        );
        assert!(app.get_available_commands().contains(&"refresh".to_string()));
    }

    #[test]
    fn test_visible_range_follows_selection() {
        let mut app = app();
        load_rows(&mut app, 100);
        app.update_viewport(10);
        assert_eq!(app.visible_range(), 0..10);

        for _ in 0..50 {
            app.next();
        }
        assert_eq!(app.current().selected(), 50);
        assert!(app.visible_range().contains(&50));

        app.go_to_bottom();
        assert_eq!(app.visible_range(), 90..100);
        app.go_to_top();
        assert_eq!(app.visible_range(), 0..10);
    }

    #[test]
    fn test_readonly_blocks_create() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut app = App::new(client, Config::default(), true, "genre").unwrap();
        app.open_create();
        assert_eq!(app.mode, Mode::Warning);
        assert!(app.current().form().is_none());
        assert!(app.warning_message.as_deref().unwrap().contains("Read-only"));
    }

    #[test]
    fn test_validation_notice_reaches_history() {
        let mut app = app();
        app.open_create();
        assert_eq!(app.mode, Mode::Form);
        app.submit_form();
        assert_eq!(app.in_flight(), 0);
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.current_toast().unwrap().message, "Required: full_name");
        app.cancel_form();
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_declined_delete_dispatches_nothing() {
        let mut app = app();
        load_rows(&mut app, 3);
        app.request_delete_selected();
        assert_eq!(app.mode, Mode::Confirm);
        app.answer_delete(false);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_responses_are_routed_to_their_resource() {
        let mut app = app();
        app.tx
            .send(Response::ListFetched {
                resource: "genre".into(),
                seq: 1,
                result: Ok(json!([{"id": 1, "name_uz": "Drama"}])),
            })
            .unwrap();
        assert!(app.drain_responses());
        assert_eq!(app.current_key, "actor");
        assert_eq!(app.controller("genre").unwrap().total(), 1);
        assert_eq!(app.current().total(), 0);
    }
}
