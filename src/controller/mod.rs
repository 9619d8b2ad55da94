//! Generic Resource Controller
//!
//! One controller drives the list, filter, form and delete lifecycle of a
//! single resource, entirely from its [`ResourceDef`]. It never performs I/O:
//! every operation that needs the network returns [`Request`]s and the
//! outcome comes back through [`ResourceController::apply`].

mod request;

pub use request::{Request, Response, SaveMode};

use crate::api::ApiError;
use crate::notification::{NoticeKind, NotificationSlot};
use crate::resource::{filter_rows, row_id, FormInput, FormState, Lookups, ResourceDef};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// State of the last list fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    Loaded,
    Failed(String),
}

/// The single open modal form of a controller
#[derive(Debug, Clone)]
pub struct FormSession {
    pub id: u64,
    pub mode: SaveMode,
    pub form: FormState,
    /// Index into the resource's fields
    pub focus: usize,
    pub saving: bool,
}

impl FormSession {
    pub fn record_id(&self) -> Option<&str> {
        match &self.mode {
            SaveMode::Create => None,
            SaveMode::Update { id } => Some(id),
        }
    }
}

/// Pending delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: String,
    pub title: String,
}

impl DeletePrompt {
    pub fn question(&self) -> String {
        format!("Delete \"{}\"?", self.title)
    }

    pub fn text(&self) -> String {
        format!("{}\n\nThis cannot be undone.", self.question())
    }
}

pub struct ResourceController {
    def: ResourceDef,
    rows: Vec<Value>,
    /// Indices into `rows` that match the query
    filtered: Vec<usize>,
    query: String,
    /// Position in `filtered`
    selected: usize,
    load: LoadState,
    list_seq_issued: u64,
    list_seq_applied: u64,
    /// Set by a successful mutation: the first list seq that reflects it
    stale_since: Option<u64>,
    lookups: Lookups,
    lookup_seq_issued: HashMap<String, u64>,
    lookup_seq_applied: HashMap<String, u64>,
    pending_lookups: HashSet<String>,
    form: Option<FormSession>,
    next_session: u64,
    prompt: Option<DeletePrompt>,
    deleting: Option<String>,
    notifications: NotificationSlot,
}

impl ResourceController {
    pub fn new(def: ResourceDef) -> Self {
        Self {
            def,
            rows: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            selected: 0,
            load: LoadState::Idle,
            list_seq_issued: 0,
            list_seq_applied: 0,
            stale_since: None,
            lookups: Lookups::new(),
            lookup_seq_issued: HashMap::new(),
            lookup_seq_applied: HashMap::new(),
            pending_lookups: HashSet::new(),
            form: None,
            next_session: 0,
            prompt: None,
            deleting: None,
            notifications: NotificationSlot::default(),
        }
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.notifications = NotificationSlot::new(duration);
        self
    }

    pub fn def(&self) -> &ResourceDef {
        &self.def
    }

    pub fn key(&self) -> &str {
        &self.def.key
    }

    // =========================================================================
    // List and lookup acquisition
    // =========================================================================

    /// Fetch the list and every lookup
    pub fn refresh(&mut self) -> Vec<Request> {
        let mut requests = vec![self.next_list_fetch()];
        for lookup in self.def.lookups.clone() {
            let seq = self.lookup_seq_issued.entry(lookup.key.clone()).or_insert(0);
            *seq += 1;
            self.pending_lookups.insert(lookup.key.clone());
            requests.push(Request::FetchLookup {
                resource: self.def.key.clone(),
                lookup: lookup.key,
                seq: *seq,
                path: lookup.path,
            });
        }
        requests
    }

    fn next_list_fetch(&mut self) -> Request {
        self.list_seq_issued += 1;
        Request::FetchList {
            resource: self.def.key.clone(),
            seq: self.list_seq_issued,
            path: self.def.paths.list.clone(),
        }
    }

    /// Mark the list stale and ask for a fetch that will reflect the mutation
    fn invalidate(&mut self) -> Request {
        let request = self.next_list_fetch();
        self.stale_since = Some(self.list_seq_issued);
        request
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// A list fetch newer than the displayed one is outstanding
    pub fn is_fetching(&self) -> bool {
        self.list_seq_applied < self.list_seq_issued
    }

    /// False between a successful mutation and the first list it is visible in
    pub fn is_consistent(&self) -> bool {
        self.stale_since.is_none()
    }

    pub fn lookups_loading(&self) -> bool {
        !self.pending_lookups.is_empty()
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    // =========================================================================
    // Rows, filter and selection
    // =========================================================================

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Rows matching the current query, in list order
    pub fn visible_rows(&self) -> impl Iterator<Item = &Value> {
        self.filtered.iter().map(move |&i| &self.rows[i])
    }

    pub fn visible_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.recompute_filter();
        self.selected = 0;
    }

    pub fn push_query_char(&mut self, c: char) {
        let mut query = std::mem::take(&mut self.query);
        query.push(c);
        self.set_query(query);
    }

    pub fn pop_query_char(&mut self) {
        let mut query = std::mem::take(&mut self.query);
        query.pop();
        self.set_query(query);
    }

    fn recompute_filter(&mut self) {
        self.filtered = filter_rows(&self.rows, &self.def.search_keys, &self.query);
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index into [`rows`](Self::rows) of the highlighted row
    pub fn selected_row_index(&self) -> Option<usize> {
        self.filtered.get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    pub fn page_down(&mut self, page: usize) {
        self.selected = (self.selected + page).min(self.filtered.len().saturating_sub(1));
    }

    pub fn page_up(&mut self, page: usize) {
        self.selected = self.selected.saturating_sub(page);
    }

    // =========================================================================
    // Form session
    // =========================================================================

    pub fn form(&self) -> Option<&FormSession> {
        self.form.as_ref()
    }

    pub fn form_inputs(&self) -> Vec<FormInput> {
        self.form
            .as_ref()
            .map(|s| self.def.form_inputs(&s.form, &self.lookups))
            .unwrap_or_default()
    }

    fn open_session(&mut self, mode: SaveMode, form: FormState) {
        self.next_session += 1;
        self.form = Some(FormSession {
            id: self.next_session,
            mode,
            form,
            focus: 0,
            saving: false,
        });
    }

    /// Open the modal with an empty form
    pub fn open_create(&mut self) {
        let form = self.def.make_empty();
        self.open_session(SaveMode::Create, form);
    }

    /// Open the modal seeded from `rows()[index]`. Refused when the resource
    /// cannot be updated or the row has no id.
    pub fn open_edit(&mut self, index: usize) -> bool {
        if !self.def.can_edit() {
            self.notifications.show(
                NoticeKind::Info,
                "Read only",
                format!("{} cannot be edited", self.def.label),
            );
            return false;
        }
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let Some(id) = row_id(row) else {
            self.notifications
                .show(NoticeKind::Error, "Cannot edit", "Record has no id");
            return false;
        };
        let form = self.def.make_from_row(row);
        self.open_session(SaveMode::Update { id }, form);
        true
    }

    /// Close the modal; refused while a save is in flight
    pub fn close_form(&mut self) -> bool {
        match &self.form {
            Some(session) if session.saving => false,
            _ => {
                self.form = None;
                true
            }
        }
    }

    pub fn focus_next(&mut self) {
        let count = self.def.fields.len();
        if let Some(session) = self.form.as_mut() {
            if count > 0 {
                session.focus = (session.focus + 1) % count;
            }
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.def.fields.len();
        if let Some(session) = self.form.as_mut() {
            if count > 0 {
                session.focus = (session.focus + count - 1) % count;
            }
        }
    }

    fn focused_field_name(&self) -> Option<String> {
        let session = self.form.as_ref()?;
        self.def.fields.get(session.focus).map(|f| f.name.clone())
    }

    /// Replace the text of a field by name
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        if let Some(session) = self.form.as_mut() {
            self.def.edit_text(&mut session.form, name, value.into());
        }
    }

    /// Apply an edit to the text of the focused field
    pub fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(name) = self.focused_field_name() else {
            return;
        };
        if let Some(session) = self.form.as_mut() {
            let mut text = session.form.text(&name).to_string();
            edit(&mut text);
            self.def.edit_text(&mut session.form, &name, text);
        }
    }

    pub fn toggle_focused(&mut self) {
        let Some(name) = self.focused_field_name() else {
            return;
        };
        if let Some(session) = self.form.as_mut() {
            self.def.toggle(&mut session.form, &name);
        }
    }

    pub fn cycle_focused(&mut self, forward: bool) {
        let Some(name) = self.focused_field_name() else {
            return;
        };
        if let Some(session) = self.form.as_mut() {
            self.def
                .cycle_option(&mut session.form, &name, &self.lookups, forward);
        }
    }

    pub fn reenable_auto_slug(&mut self) {
        if let Some(session) = self.form.as_mut() {
            self.def.reenable_auto_slug(&mut session.form);
        }
    }

    /// Validate the open form and issue the save. Returns `None` when there
    /// is no form, a save is already in flight or required fields are empty.
    pub fn submit(&mut self) -> Option<Request> {
        let session = self.form.as_mut()?;
        if session.saving {
            return None;
        }
        let payload = self.def.to_payload(&session.form);
        if let Err(err) = self.def.validate(&payload) {
            self.notifications
                .show(NoticeKind::Error, "Validation error", err.to_string());
            return None;
        }
        let path = match &session.mode {
            SaveMode::Create => self.def.paths.create.clone(),
            SaveMode::Update { id } => self.def.update_path(id)?,
        };
        session.saving = true;
        tracing::info!("{}: saving {:?}", self.def.key, session.mode);
        Some(Request::Save {
            resource: self.def.key.clone(),
            session: session.id,
            mode: session.mode.clone(),
            path,
            payload,
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete_prompt(&self) -> Option<&DeletePrompt> {
        self.prompt.as_ref()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_some()
    }

    /// Ask for confirmation before deleting `rows()[index]`
    pub fn request_delete(&mut self, index: usize) -> bool {
        if !self.def.can_delete() || self.deleting.is_some() {
            return false;
        }
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let Some(id) = row_id(row) else {
            self.notifications
                .show(NoticeKind::Error, "Cannot delete", "Record has no id");
            return false;
        };
        self.prompt = Some(DeletePrompt {
            title: self.def.row_title(row),
            id,
        });
        true
    }

    /// Answer the pending prompt. Declining issues nothing.
    pub fn confirm_delete(&mut self, accepted: bool) -> Option<Request> {
        let prompt = self.prompt.take()?;
        if !accepted || self.deleting.is_some() {
            return None;
        }
        let path = self.def.remove_path(&prompt.id)?;
        tracing::info!("{}: deleting {}", self.def.key, prompt.id);
        self.deleting = Some(prompt.id.clone());
        Some(Request::Delete {
            resource: self.def.key.clone(),
            id: prompt.id,
            path,
        })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn notifications(&self) -> &NotificationSlot {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationSlot {
        &mut self.notifications
    }

    // =========================================================================
    // Responses
    // =========================================================================

    /// Fold a finished request into the controller. Successful mutations
    /// return the list refetch they trigger.
    pub fn apply(&mut self, response: Response) -> Vec<Request> {
        match response {
            Response::ListFetched { seq, result, .. } => {
                self.apply_list(seq, result);
                Vec::new()
            }
            Response::LookupFetched {
                lookup,
                seq,
                result,
                ..
            } => {
                self.apply_lookup(lookup, seq, result);
                Vec::new()
            }
            Response::Saved {
                session,
                mode,
                result,
                ..
            } => self.apply_saved(session, mode, result),
            Response::Deleted { id, result, .. } => self.apply_deleted(id, result),
        }
    }

    fn apply_list(&mut self, seq: u64, result: Result<Value, ApiError>) {
        if seq <= self.list_seq_applied {
            tracing::debug!(
                "{}: dropping stale list response #{} (showing #{})",
                self.def.key,
                seq,
                self.list_seq_applied
            );
            return;
        }
        self.list_seq_applied = seq;
        match result {
            Ok(Value::Array(rows)) => {
                self.rows = rows;
                self.load = LoadState::Loaded;
            }
            Ok(other) => {
                tracing::debug!("{}: list body is not an array: {}", self.def.key, other);
                self.rows.clear();
                self.load = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!("{}: list failed: {}", self.def.key, err);
                self.rows.clear();
                self.load = LoadState::Failed(err.to_string());
            }
        }
        if matches!(self.load, LoadState::Loaded) && self.stale_since.is_some_and(|s| seq >= s) {
            self.stale_since = None;
        }
        self.recompute_filter();
    }

    fn apply_lookup(&mut self, lookup: String, seq: u64, result: Result<Value, ApiError>) {
        let applied = self.lookup_seq_applied.entry(lookup.clone()).or_insert(0);
        if seq <= *applied {
            tracing::debug!("{}: dropping stale lookup {} #{}", self.def.key, lookup, seq);
            return;
        }
        *applied = seq;
        if self.lookup_seq_issued.get(&lookup).copied().unwrap_or(0) <= seq {
            self.pending_lookups.remove(&lookup);
        }
        let rows = match result {
            Ok(Value::Array(rows)) => rows,
            Ok(_) => Vec::new(),
            Err(err) => {
                tracing::warn!("{}: lookup {} failed: {}", self.def.key, lookup, err);
                Vec::new()
            }
        };
        self.lookups.insert(lookup, rows);
    }

    fn apply_saved(
        &mut self,
        session: u64,
        mode: SaveMode,
        result: Result<Value, ApiError>,
    ) -> Vec<Request> {
        let same_session = self.form.as_ref().is_some_and(|s| s.id == session);
        if same_session {
            if let Some(open) = self.form.as_mut() {
                open.saving = false;
            }
        }
        match result {
            Ok(_) => {
                let title = match mode {
                    SaveMode::Create => "Created",
                    SaveMode::Update { .. } => "Updated",
                };
                tracing::info!("{}: {}", self.def.key, title.to_lowercase());
                self.notifications.show(NoticeKind::Success, title, "Saved");
                if same_session {
                    self.form = None;
                }
                vec![self.invalidate()]
            }
            Err(err) => {
                self.notifications
                    .show(NoticeKind::Error, "Save failed", err.to_string());
                Vec::new()
            }
        }
    }

    fn apply_deleted(&mut self, id: String, result: Result<Value, ApiError>) -> Vec<Request> {
        if self.deleting.as_deref() == Some(id.as_str()) {
            self.deleting = None;
        }
        match result {
            Ok(_) => {
                tracing::info!("{}: deleted {}", self.def.key, id);
                self.notifications
                    .show(NoticeKind::Success, "Deleted", "Removed");
                vec![self.invalidate()]
            }
            Err(err) => {
                self.notifications
                    .show(NoticeKind::Error, "Delete failed", err.to_string());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::get_resource;
    use serde_json::json;

    fn controller(key: &str) -> ResourceController {
        ResourceController::new(get_resource(key).unwrap().clone())
    }

    fn list_seq(requests: &[Request]) -> u64 {
        match &requests[0] {
            Request::FetchList { seq, .. } => *seq,
            other => panic!("expected list fetch, got {:?}", other),
        }
    }

    fn list(resource: &str, seq: u64, body: Value) -> Response {
        Response::ListFetched {
            resource: resource.into(),
            seq,
            result: Ok(body),
        }
    }

    #[test]
    fn test_refresh_issues_list_and_lookups() {
        let mut c = controller("movie_actor");
        let requests = c.refresh();
        assert_eq!(requests.len(), 3);
        assert!(c.lookups_loading());
        assert!(matches!(&requests[1], Request::FetchLookup { lookup, path, .. }
            if lookup == "movies" && path == "/movie"));

        c.apply(Response::LookupFetched {
            resource: "movie_actor".into(),
            lookup: "movies".into(),
            seq: 1,
            result: Ok(json!([{"id": 1}])),
        });
        assert!(c.lookups_loading());
        c.apply(Response::LookupFetched {
            resource: "movie_actor".into(),
            lookup: "actors".into(),
            seq: 1,
            result: Err(ApiError::Transport("down".into())),
        });
        assert!(!c.lookups_loading());
        assert!(c.lookups()["actors"].is_empty());
    }

    #[test]
    fn test_non_array_list_is_empty() {
        let mut c = controller("actor");
        let seq = list_seq(&c.refresh());
        c.apply(list("actor", seq, json!({"items": []})));
        assert_eq!(c.total(), 0);
        assert_eq!(c.load_state(), &LoadState::Loaded);
    }

    #[test]
    fn test_failed_list_clears_rows() {
        let mut c = controller("actor");
        let seq = list_seq(&c.refresh());
        c.apply(list("actor", seq, json!([{"id": 1, "full_name": "A"}])));
        let seq = list_seq(&c.refresh());
        c.apply(Response::ListFetched {
            resource: "actor".into(),
            seq,
            result: Err(ApiError::rejected(500, Value::Null)),
        });
        assert_eq!(c.total(), 0);
        assert_eq!(
            c.load_state(),
            &LoadState::Failed("Request failed (500)".into())
        );
    }

    #[test]
    fn test_stale_list_response_is_dropped() {
        let mut c = controller("genre");
        let first = list_seq(&c.refresh());
        let second = list_seq(&c.refresh());
        c.apply(list("genre", second, json!([{"id": 2, "name_uz": "New"}])));
        c.apply(list("genre", first, json!([{"id": 1, "name_uz": "Old"}])));
        assert_eq!(c.rows()[0]["name_uz"], "New");
        assert!(!c.is_fetching());
    }

    #[test]
    fn test_filter_recomputed_on_list_change() {
        let mut c = controller("actor");
        c.set_query("jane");
        let seq = list_seq(&c.refresh());
        c.apply(list(
            "actor",
            seq,
            json!([{"id": 1, "full_name": "Jane"}, {"id": 2, "full_name": "Bob"}]),
        ));
        assert_eq!(c.visible_len(), 1);
        c.pop_query_char();
        c.pop_query_char();
        c.pop_query_char();
        c.pop_query_char();
        assert_eq!(c.visible_len(), 2);
    }

    #[test]
    fn test_visible_rows_follow_filter_rows() {
        let rows = json!([
            {"id": 1, "full_name": "Jane Doe", "country": "USA"},
            {"id": 2, "full_name": "Bob", "country": "Uzbekistan"},
            {"id": 3, "full_name": "Ali", "country": "France"}
        ]);
        let mut c = controller("actor");
        let seq = list_seq(&c.refresh());
        c.apply(list("actor", seq, rows.clone()));
        c.set_query("  US ");

        let expected = filter_rows(rows.as_array().unwrap(), &c.def().search_keys, "  US ");
        assert_eq!(expected, vec![0]);
        let visible: Vec<_> = c.visible_rows().map(|r| r["id"].clone()).collect();
        assert_eq!(visible, vec![json!(1)]);
    }

    #[test]
    fn test_submit_rejects_missing_required_without_request() {
        let mut c = controller("category");
        c.open_create();
        assert!(c.submit().is_none());
        let notice = c.notifications().current().unwrap();
        assert_eq!(notice.title, "Validation error");
        assert_eq!(notice.message, "Required: name_uz, slug");
        assert!(c.form().is_some());
    }

    #[test]
    fn test_save_success_closes_form_and_refetches() {
        let mut c = controller("category");
        c.open_create();
        c.set_field("name_uz", "Komediya");
        let save = c.submit().unwrap();
        assert!(c.submit().is_none(), "second submit while saving");
        assert!(!c.close_form(), "cannot cancel while saving");

        let (session, mode) = match save {
            Request::Save {
                session,
                mode,
                payload,
                ..
            } => {
                assert_eq!(payload["slug"], "komediya");
                (session, mode)
            }
            other => panic!("unexpected {:?}", other),
        };
        let follow = c.apply(Response::Saved {
            resource: "category".into(),
            session,
            mode,
            result: Ok(json!({"id": 1})),
        });
        assert!(c.form().is_none());
        assert!(!c.is_consistent());
        let seq = list_seq(&follow);
        c.apply(list("category", seq, json!([{"id": 1, "name_uz": "Komediya"}])));
        assert!(c.is_consistent());
        assert_eq!(c.notifications().current().unwrap().title, "Created");
    }

    #[test]
    fn test_save_failure_keeps_form_open() {
        let mut c = controller("actor");
        c.open_create();
        c.set_field("full_name", "X");
        let Some(Request::Save { session, mode, .. }) = c.submit() else {
            panic!("expected save");
        };
        let follow = c.apply(Response::Saved {
            resource: "actor".into(),
            session,
            mode,
            result: Err(ApiError::rejected(400, json!({"message": "Duplicate"}))),
        });
        assert!(follow.is_empty());
        assert!(c.is_consistent());
        let session = c.form().unwrap();
        assert!(!session.saving);
        let notice = c.notifications().current().unwrap();
        assert_eq!((notice.title.as_str(), notice.message.as_str()), ("Save failed", "Duplicate"));
    }

    #[test]
    fn test_edit_uses_patch_path() {
        let mut c = controller("genre");
        let seq = list_seq(&c.refresh());
        c.apply(list("genre", seq, json!([{"id": 5, "name_uz": "Drama", "slug": "drama"}])));
        assert!(c.open_edit(0));
        assert_eq!(c.form().unwrap().record_id(), Some("5"));
        match c.submit().unwrap() {
            Request::Save { path, mode, .. } => {
                assert_eq!(path, "/genre/5");
                assert_eq!(mode, SaveMode::Update { id: "5".into() });
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_row_without_id_refuses_edit_and_delete() {
        let mut c = controller("genre");
        let seq = list_seq(&c.refresh());
        c.apply(list("genre", seq, json!([{"name_uz": "Orphan"}])));
        assert!(!c.open_edit(0));
        assert!(!c.request_delete(0));
        assert_eq!(c.notifications().current().unwrap().title, "Cannot delete");
    }

    #[test]
    fn test_delete_decline_and_accept() {
        let mut c = controller("category");
        let seq = list_seq(&c.refresh());
        c.apply(list(
            "category",
            seq,
            json!([{"id": 9, "name_uz": "Komediya", "slug": "komediya"}]),
        ));

        assert!(c.request_delete(0));
        assert_eq!(
            c.delete_prompt().unwrap().text(),
            "Delete \"Komediya\"?\n\nThis cannot be undone."
        );
        assert!(c.confirm_delete(false).is_none());
        assert!(c.delete_prompt().is_none());

        c.request_delete(0);
        let request = c.confirm_delete(true).unwrap();
        assert!(matches!(&request, Request::Delete { path, .. } if path == "/category/9"));
        assert!(c.is_deleting());
        assert!(!c.request_delete(0), "delete already in flight");

        let follow = c.apply(Response::Deleted {
            resource: "category".into(),
            id: "9".into(),
            result: Ok(Value::Null),
        });
        assert_eq!(follow.len(), 1);
        assert!(!c.is_deleting());
        assert_eq!(c.notifications().current().unwrap().message, "Removed");
    }

    #[test]
    fn test_delete_failure_does_not_invalidate() {
        let mut c = controller("genre");
        let follow = c.apply(Response::Deleted {
            resource: "genre".into(),
            id: "1".into(),
            result: Err(ApiError::Transport("offline".into())),
        });
        assert!(follow.is_empty());
        assert!(c.is_consistent());
        assert_eq!(c.notifications().current().unwrap().title, "Delete failed");
    }

    #[test]
    fn test_focused_editing_drives_slug() {
        let mut c = controller("genre");
        c.open_create();
        c.edit_focused(|s| s.push_str("Ilmiy Fantastika"));
        assert_eq!(c.form().unwrap().form.text("slug"), "ilmiy-fantastika");
        c.focus_prev();
        assert_eq!(c.form().unwrap().focus, c.def().fields.len() - 1);
        c.toggle_focused();
        assert!(!c.form().unwrap().form.flag("is_active"));
    }

    #[test]
    fn test_selection_is_clamped_to_filter() {
        let mut c = controller("actor");
        let seq = list_seq(&c.refresh());
        c.apply(list(
            "actor",
            seq,
            json!([{"id": 1, "full_name": "A"}, {"id": 2, "full_name": "B"}, {"id": 3, "full_name": "C"}]),
        ));
        c.select_last();
        assert_eq!(c.selected_row_index(), Some(2));
        c.set_query("b");
        assert_eq!(c.selected_row_index(), Some(1));
        c.set_query("nobody");
        assert_eq!(c.selected_row_index(), None);
    }
}
