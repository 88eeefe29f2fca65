use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config;

/// Persisted copy of every field value, keyed by field name.
pub type Snapshot = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(checked) => !checked,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(true) => "on",
            FieldValue::Flag(false) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }

    /// Checkboxes are stored the way a browser form serialises them.
    pub fn from_snapshot(raw: &str, checkbox: bool) -> Self {
        if checkbox {
            FieldValue::Flag(raw == "on" || raw == "true")
        } else {
            FieldValue::Text(raw.to_string())
        }
    }
}

/// Shared flag telling in-flight work whether its session still exists.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn end(&self) {
        self.0.set(false);
    }

    pub fn same_session(&self, other: &Liveness) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct FormSession {
    pub current_step: usize,
    pub total_steps: usize,
    pub values: BTreeMap<String, FieldValue>,
    pub last_activity: DateTime<Utc>,
    pub liveness: Liveness,
}

impl FormSession {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps: total_steps.max(1),
            values: BTreeMap::new(),
            last_activity: Utc::now(),
            liveness: Liveness::new(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn has_data(&self) -> bool {
        self.values.values().any(|value| !value.is_blank())
    }

    /// Unchecked boxes and blank values are left out, like a submitted HTML form.
    pub fn snapshot(&self) -> Snapshot {
        self.values
            .iter()
            .filter(|(_, value)| !value.as_text().is_empty())
            .map(|(name, value)| (name.clone(), value.as_text().to_string()))
            .collect()
    }

    /// Start of the window during which leaving should prompt, if any.
    fn abandon_window_start(&self) -> Option<DateTime<Utc>> {
        self.has_data().then_some(self.last_activity)
    }

    pub fn should_warn_on_leave(&self, now: DateTime<Utc>) -> bool {
        self.abandon_window_start()
            .map_or(false, |start| within_abandon_window(start, now))
    }
}

fn within_abandon_window(last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_activity < Duration::seconds(config::ABANDON_WINDOW_SECS)
}

/// Latest copy of the session for the `beforeunload` listener, which runs
/// outside the component and cannot borrow the controller.
#[derive(Clone, Debug, Default)]
pub struct LeaveGuard(Rc<RefCell<Option<FormSession>>>);

impl LeaveGuard {
    pub fn sync(&self, session: &FormSession) {
        *self.0.borrow_mut() = Some(session.clone());
    }

    pub fn disarm(&self) {
        *self.0.borrow_mut() = None;
    }

    pub fn should_warn(&self, now: DateTime<Utc>) -> bool {
        self.0
            .borrow()
            .as_ref()
            .map_or(false, |session| session.should_warn_on_leave(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_skips_blank_and_unchecked() {
        let mut session = FormSession::new(3);
        session.values.insert("name".into(), FieldValue::text("Ana"));
        session.values.insert("company".into(), FieldValue::text(""));
        session.values.insert("newsletter".into(), FieldValue::Flag(false));
        session.values.insert("privacy-consent".into(), FieldValue::Flag(true));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("name").map(String::as_str), Some("Ana"));
        assert_eq!(snapshot.get("privacy-consent").map(String::as_str), Some("on"));
    }

    #[test]
    fn test_leave_warning_window() {
        let mut session = FormSession::new(3);
        let now = Utc::now();
        session.touch(now);
        assert!(!session.should_warn_on_leave(now), "empty form never warns");

        session.values.insert("email".into(), FieldValue::text("ana@x.com"));
        assert!(session.should_warn_on_leave(now + Duration::seconds(10)));
        assert!(!session.should_warn_on_leave(now + Duration::seconds(31)));
    }

    #[test]
    fn test_leave_guard_follows_session() {
        let mut session = FormSession::new(3);
        let now = Utc::now();
        session.touch(now);
        let guard = LeaveGuard::default();
        let listener_copy = guard.clone();

        guard.sync(&session);
        assert!(!listener_copy.should_warn(now));

        session.values.insert("name".into(), FieldValue::text("Ana"));
        guard.sync(&session);
        let later = now + Duration::seconds(5);
        assert_eq!(listener_copy.should_warn(later), session.should_warn_on_leave(later));
        assert!(listener_copy.should_warn(later));

        guard.disarm();
        assert!(!listener_copy.should_warn(later));
    }

    #[test]
    fn test_liveness_is_shared_per_session() {
        let a = Liveness::new();
        let a2 = a.clone();
        let b = Liveness::new();
        assert!(a.same_session(&a2));
        assert!(!a.same_session(&b));
        a.end();
        assert!(!a2.is_alive());
        assert!(b.is_alive());
    }

    #[test]
    fn test_checkbox_from_snapshot() {
        assert!(FieldValue::from_snapshot("on", true).is_checked());
        assert!(FieldValue::from_snapshot("true", true).is_checked());
        assert!(!FieldValue::from_snapshot("no", true).is_checked());
        assert_eq!(FieldValue::from_snapshot("on", false), FieldValue::text("on"));
    }
}
