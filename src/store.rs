// File: src/store.rs
//! Boundary with the event persistence backend.
//!
//! The controller only talks to `dyn EventStore`. Two implementations ship with
//! the crate: an in-memory store and a JSON file store.
use crate::model::{Event, EventId, EventPatch, NewEvent};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

pub mod local;
pub mod memory;

pub use local::LocalEventStore;
pub use memory::MemoryEventStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected the payload. The user has to fix the input.
    #[error("Invalid event: {0}")]
    Validation(String),

    /// The event vanished between read and write.
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// Transport or backend failure. Safe to retry by hand.
    #[error("Network error: {0}")]
    Network(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Date range for listing events. `None` means unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `days` before and after `center`, whole days. A side that would fall
    /// outside the representable calendar is left unbounded.
    pub fn around(center: NaiveDate, days: u32) -> Self {
        let days = Duration::days(i64::from(days));
        let from = center.and_time(NaiveTime::MIN).checked_sub_signed(days);
        let to = center
            .succ_opt()
            .and_then(|next| next.and_time(NaiveTime::MIN).checked_add_signed(days));
        Self { from, to }
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Start inclusive, end exclusive.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at < to)
    }
}

/// Persistence operations consumed by the controller. Every call may fail;
/// callers do not retry.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug {
    async fn list(&self, range: DateRange) -> StoreResult<Vec<Event>>;

    /// Persist a new event and return it with its assigned id.
    async fn create(&self, draft: NewEvent) -> StoreResult<Event>;

    async fn update(&self, id: &EventId, patch: EventPatch) -> StoreResult<Event>;

    async fn delete(&self, id: &EventId) -> StoreResult<()>;
}

/// Checks shared by the bundled stores.
pub(crate) fn validate(payload: &NewEvent) -> StoreResult<()> {
    if payload.title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".to_string()));
    }
    if payload.duration_minutes == 0 {
        return Err(StoreError::Validation(
            "duration must be at least one minute".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn range_around_covers_whole_days() {
        let range = DateRange::around(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 2);
        assert!(range.contains(dt(8, 0)));
        assert!(range.contains(dt(12, 23)));
        assert!(!range.contains(dt(7, 23)));
        assert!(!range.contains(dt(13, 0)));
    }

    #[test]
    fn huge_window_saturates_to_unbounded() {
        let range = DateRange::around(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), u32::MAX);
        assert_eq!(range, DateRange::unbounded());
        assert!(range.contains(dt(1, 0)));

        let near_end = DateRange::around(NaiveDate::MAX, 1);
        assert!(near_end.from.is_some());
        assert!(near_end.to.is_none());
        assert!(!near_end.is_bounded());
    }

    #[test]
    fn unbounded_range_contains_everything() {
        assert!(DateRange::unbounded().contains(dt(1, 0)));
    }
}
