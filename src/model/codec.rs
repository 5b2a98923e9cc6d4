// File: ./src/model/codec.rs
//! Conversions between canonical events (absolute start, minutes) and the
//! strings shown in the event form ("9:00 AM", "30 min", "2 hours").
//!
//! Parsing is deliberately forgiving: a time that cannot be read leaves the
//! base date untouched and a duration that cannot be read becomes one hour.
use crate::model::event::{DEFAULT_EVENT_COLOR, DisplayEvent, Event, EventDraft, NewEvent};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Duration used when the duration field cannot be parsed.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*(AM|PM)\b").expect("valid time regex")
});
static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+\.?\d*)\s*(min|hour|hr|h)").expect("valid duration regex")
});

/// Render the clock part of `start` as `H:MM AM|PM`.
pub fn decode_time(start: NaiveDateTime) -> String {
    let hour = start.hour();
    let (h12, suffix) = match hour {
        0 => (12, "AM"),
        12 => (12, "PM"),
        h if h > 12 => (h % 12, "PM"),
        h => (h, "AM"),
    };
    format!("{}:{:02} {}", h12, start.minute(), suffix)
}

/// Render a minute count as `N min` or `N hour(s)`.
///
/// Counts of an hour or more are divided by 60 without rounding, so 90 becomes
/// `1.5 hour`: the plural label only starts at two hours. `encode_duration`
/// reads that form back to the same minute count.
pub fn decode_duration(minutes: u32) -> String {
    if minutes >= 60 {
        let hours = f64::from(minutes) / 60.0;
        let label = if minutes >= 120 { "hours" } else { "hour" };
        format!("{} {}", hours, label)
    } else {
        format!("{} min", minutes)
    }
}

/// Apply a `H:MM AM|PM` string to `base`, zeroing seconds.
///
/// Returns `base` unchanged when the string does not parse.
pub fn encode_time(base: NaiveDateTime, display: &str) -> NaiveDateTime {
    match parse_clock(display) {
        Some(time) => base.date().and_time(time),
        None => {
            log::debug!("Unparseable time '{}', keeping {}", display, base);
            base
        }
    }
}

fn parse_clock(display: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(display)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let is_pm = caps[3].eq_ignore_ascii_case("pm");
    let hour_24 = match (is_pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };
    NaiveTime::from_hms_opt(hour_24, minute, 0)
}

/// Parse `30 min`, `2 hours`, `1.5h`, `1 hr` into minutes.
///
/// Falls back to [`DEFAULT_DURATION_MINUTES`] when nothing parses or the
/// result rounds to zero.
pub fn encode_duration(display: &str) -> u32 {
    let Some(caps) = DURATION_RE.captures(display) else {
        log::debug!("Unparseable duration '{}', using default", display);
        return DEFAULT_DURATION_MINUTES;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return DEFAULT_DURATION_MINUTES;
    };
    let minutes = if caps[2].eq_ignore_ascii_case("min") {
        value
    } else {
        value * 60.0
    };
    let rounded = minutes.round();
    if rounded < 1.0 || rounded > f64::from(u32::MAX) {
        return DEFAULT_DURATION_MINUTES;
    }
    rounded as u32
}

/// Canonical event to the form the presentation layer renders.
pub fn decode_event(event: Event) -> DisplayEvent {
    DisplayEvent {
        time: decode_time(event.start),
        duration: decode_duration(event.duration_minutes),
        date: event.start.date(),
        category: event.kind.category(),
        id: event.id,
        title: event.title,
        start: event.start,
        duration_minutes: event.duration_minutes,
        kind: event.kind,
        attendees: event.attendees,
        location: event.location,
        color: event.color,
        description: event.description,
    }
}

/// Form fields to a canonical create/update payload.
pub fn encode_draft(draft: &EventDraft) -> NewEvent {
    let base = midnight(draft.date);
    NewEvent {
        title: draft.title.trim().to_string(),
        start: encode_time(base, &draft.time),
        duration_minutes: encode_duration(&draft.duration),
        kind: draft.kind,
        attendees: draft
            .attendees
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
        location: non_blank(&draft.location),
        color: non_blank(&draft.color).unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
        description: non_blank(&draft.description),
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
