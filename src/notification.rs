//! Notification System
//!
//! Every resource controller owns one [`NotificationSlot`]: showing a new
//! message replaces the current one and restarts its dismiss timer. The host
//! copies each new message into a bounded [`NotificationHistory`] for the
//! history panel.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default time a toast stays visible
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2600);

/// Maximum notifications kept in the history panel
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Info => "ℹ",
        }
    }
}

/// A single toast message
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
    pub timestamp: DateTime<Local>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
            timestamp: Local::now(),
        }
    }

    /// One-line form used in the footer
    pub fn toast_line(&self) -> String {
        if self.message.is_empty() {
            format!("{} {}", self.kind.icon(), self.title)
        } else {
            format!("{} {}: {}", self.kind.icon(), self.title, self.message)
        }
    }
}

/// Single-slot toast with auto-dismiss
#[derive(Debug, Clone)]
pub struct NotificationSlot {
    current: Option<Notice>,
    duration: Duration,
    /// Id of the newest notice not yet copied into the history
    unrecorded: Option<Uuid>,
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl NotificationSlot {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
            unrecorded: None,
        }
    }

    /// Replace the current notice and restart the timer
    pub fn show(&mut self, kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice::new(kind, title, message);
        self.unrecorded = Some(notice.id);
        self.current = Some(notice);
    }

    /// The notice visible at `now`, if it has not expired
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.duration)
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Hand out the newest notice once, for the history panel
    pub fn take_unrecorded(&mut self) -> Option<Notice> {
        let id = self.unrecorded.take()?;
        self.current.as_ref().filter(|n| n.id == id).cloned()
    }
}

/// Notice recorded together with the resource that raised it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub resource: String,
    pub notice: Notice,
}

/// Bounded history of every notice shown (most recent first)
#[derive(Debug, Clone)]
pub struct NotificationHistory {
    entries: VecDeque<HistoryEntry>,
    max_history: usize,
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl NotificationHistory {
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_history,
        }
    }

    pub fn record(&mut self, resource: &str, notice: Notice) {
        self.entries.push_front(HistoryEntry {
            resource: resource.to_string(),
            notice,
        });
        self.entries.truncate(self.max_history);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.notice.kind == NoticeKind::Error)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_replaces_current() {
        let mut slot = NotificationSlot::default();
        slot.show(NoticeKind::Success, "Created", "Saved");
        slot.show(NoticeKind::Error, "Save failed", "boom");

        let current = slot.current().unwrap();
        assert_eq!(current.title, "Save failed");
        assert_eq!(current.kind, NoticeKind::Error);
    }

    #[test]
    fn test_auto_dismiss_after_duration() {
        let mut slot = NotificationSlot::new(Duration::from_millis(2600));
        slot.show(NoticeKind::Info, "Hello", "");
        let shown = slot.current().unwrap().shown_at;

        assert!(slot.current_at(shown + Duration::from_millis(2599)).is_some());
        assert!(slot.current_at(shown + Duration::from_millis(2600)).is_none());
    }

    #[test]
    fn test_dismiss_clears_current() {
        let mut slot = NotificationSlot::default();
        slot.show(NoticeKind::Success, "Updated", "Saved");
        slot.dismiss();
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_unrecorded_is_taken_once() {
        let mut slot = NotificationSlot::default();
        assert!(slot.take_unrecorded().is_none());
        slot.show(NoticeKind::Success, "Deleted", "Removed");
        assert_eq!(slot.take_unrecorded().unwrap().title, "Deleted");
        assert!(slot.take_unrecorded().is_none());
    }

    #[test]
    fn test_history_is_bounded_and_newest_first() {
        let mut history = NotificationHistory::new(3);
        for i in 0..5 {
            history.record("actor", Notice::new(NoticeKind::Info, format!("n{}", i), ""));
        }
        let titles: Vec<_> = history.iter().map(|e| e.notice.title.as_str()).collect();
        assert_eq!(titles, vec!["n4", "n3", "n2"]);
    }

    #[test]
    fn test_toast_line() {
        let notice = Notice::new(NoticeKind::Error, "Validation error", "Required: full_name");
        assert_eq!(notice.toast_line(), "✗ Validation error: Required: full_name");
        assert_eq!(Notice::new(NoticeKind::Info, "Refreshing", "").toast_line(), "ℹ Refreshing");
    }
}
