// File: ./src/model/event.rs
use crate::category::{CategoryId, category_of};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Color used when an event carries none.
pub const DEFAULT_EVENT_COLOR: &str = "#3b82f6";

/// Opaque identifier assigned by the event store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventKind {
    Work,
    #[default]
    Personal,
    Family,
    Holiday,
    Birthday,
    Travel,
    Reminder,
    Deadline,
}

impl EventKind {
    /// Lenient parse: anything that is not a known kind is treated as personal.
    pub fn parse_lossy(s: &str) -> Self {
        s.trim().parse().unwrap_or_default()
    }

    pub fn category(self) -> CategoryId {
        category_of(self)
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        Self::parse_lossy(&s)
    }
}

/// Canonical event record as held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    #[serde(default)]
    pub kind: EventKind,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

impl Event {
    /// Attach a store-assigned id to a payload.
    pub fn from_new(id: EventId, payload: NewEvent) -> Self {
        Self {
            id,
            title: payload.title,
            start: payload.start,
            duration_minutes: payload.duration_minutes,
            kind: payload.kind,
            attendees: payload.attendees,
            location: payload.location,
            color: payload.color,
            description: payload.description,
        }
    }

    /// Overwrite every field but the id.
    pub fn apply(&mut self, payload: NewEvent) {
        let id = self.id.clone();
        *self = Self::from_new(id, payload);
    }
}

/// Canonical payload for create and update. Same shape as `Event` without the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub kind: EventKind,
    pub attendees: Vec<String>,
    pub location: Option<String>,
    pub color: String,
    pub description: Option<String>,
}

/// Update payload. Updates replace the full record, so this is the create payload.
pub type EventPatch = NewEvent;

/// Event as shown by the presentation layer: canonical fields plus the
/// human-facing time and duration strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
    pub date: NaiveDate,
    pub time: String,
    pub duration: String,
    pub duration_minutes: u32,
    pub kind: EventKind,
    pub category: CategoryId,
    pub attendees: Vec<String>,
    pub location: Option<String>,
    pub color: String,
    pub description: Option<String>,
}

impl DisplayEvent {
    /// Whether light text should be drawn on top of this event's color.
    pub fn wants_light_text(&self) -> bool {
        crate::color_utils::parse_hex_to_floats(&self.color)
            .map(|(r, g, b)| crate::color_utils::is_dark(r, g, b))
            .unwrap_or(false)
    }
}

/// Editable form fields. Time and duration stay in display form until save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: String,
    pub kind: EventKind,
    pub attendees: Vec<String>,
    pub location: String,
    pub color: String,
    pub description: String,
}

impl EventDraft {
    /// Blank form pre-filled with a date.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            time: "9:00 AM".to_string(),
            duration: "1 hour".to_string(),
            kind: EventKind::default(),
            attendees: Vec::new(),
            location: String::new(),
            color: String::new(),
            description: String::new(),
        }
    }

    pub fn from_event(event: &DisplayEvent) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date,
            time: event.time.clone(),
            duration: event.duration.clone(),
            kind: event.kind,
            attendees: event.attendees.clone(),
            location: event.location.clone().unwrap_or_default(),
            color: event.color.clone(),
            description: event.description.clone().unwrap_or_default(),
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_lenient() {
        assert_eq!(EventKind::parse_lossy("WORK"), EventKind::Work);
        assert_eq!(EventKind::parse_lossy(" holiday "), EventKind::Holiday);
        assert_eq!(EventKind::parse_lossy("meeting"), EventKind::Personal);
        assert_eq!(EventKind::parse_lossy(""), EventKind::Personal);
    }

    #[test]
    fn unknown_kind_in_json_falls_back_to_personal() {
        let json = r#"{"id":"7","title":"Lunch","start":"2024-03-01T12:00:00","duration_minutes":45,"kind":"lunch"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::Personal);
        assert_eq!(event.color, DEFAULT_EVENT_COLOR);
        assert!(event.attendees.is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&EventKind::Birthday).unwrap();
        assert_eq!(json, "\"birthday\"");
    }

    #[test]
    fn text_contrast_follows_color() {
        let mut display = crate::model::decode_event(Event {
            id: EventId::from("1"),
            title: "Open house".into(),
            start: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: 60,
            kind: EventKind::Work,
            attendees: vec![],
            location: None,
            color: DEFAULT_EVENT_COLOR.into(),
            description: None,
        });
        assert!(display.wants_light_text());
        display.color = "#fde68a".into();
        assert!(!display.wants_light_text());
        display.color = "not-a-color".into();
        assert!(!display.wants_light_text());
    }
}
