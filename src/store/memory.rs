// File: src/store/memory.rs
use super::{DateRange, EventStore, StoreError, StoreResult, validate};
use crate::model::{Event, EventId, EventPatch, NewEvent};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    events: Vec<Event>,
}

/// Process-local event store. Ids are sequential numbers starting at 1.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records. Ids keep counting after the
    /// highest numeric id present.
    pub fn with_events(events: Vec<Event>) -> Self {
        let next_id = events
            .iter()
            .filter_map(|e| e.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            inner: Mutex::new(Inner { next_id, events }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|g| g.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Network("event store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn list(&self, range: DateRange) -> StoreResult<Vec<Event>> {
        let inner = self.lock()?;
        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| range.contains(e.start))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn create(&self, draft: NewEvent) -> StoreResult<Event> {
        validate(&draft)?;
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let event = Event::from_new(EventId::new(inner.next_id.to_string()), draft);
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> StoreResult<Event> {
        validate(&patch)?;
        let mut inner = self.lock()?;
        let event = inner
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        event.apply(patch);
        Ok(event.clone())
    }

    async fn delete(&self, id: &EventId) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let before = inner.events.len();
        inner.events.retain(|e| &e.id != id);
        if inner.events.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_EVENT_COLOR, EventKind};
    use chrono::NaiveDate;

    fn payload(title: &str, day: u32) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            start: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: 30,
            kind: EventKind::Work,
            attendees: vec![],
            location: None,
            color: DEFAULT_EVENT_COLOR.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryEventStore::new();
        let a = store.create(payload("A", 1)).await.unwrap();
        let b = store.create(payload("B", 2)).await.unwrap();
        assert_eq!(a.id.as_str(), "1");
        assert_eq!(b.id.as_str(), "2");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let store = MemoryEventStore::new();
        let err = store.create(payload("   ", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn list_is_sorted_and_filtered_by_range() {
        let store = MemoryEventStore::new();
        store.create(payload("Late", 20)).await.unwrap();
        store.create(payload("Early", 2)).await.unwrap();
        store.create(payload("Mid", 10)).await.unwrap();

        let all = store.list(DateRange::unbounded()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Mid", "Late"]);

        let range = DateRange::around(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 1);
        let near = store.list(range).await.unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].title, "Mid");
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let store = MemoryEventStore::new();
        let missing = EventId::from("42");
        assert_eq!(
            store.update(&missing, payload("X", 1)).await.unwrap_err(),
            StoreError::NotFound(missing.clone())
        );
        assert_eq!(
            store.delete(&missing).await.unwrap_err(),
            StoreError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn seeded_store_continues_ids() {
        let seed = Event::from_new(EventId::from("7"), payload("Seed", 1));
        let store = MemoryEventStore::with_events(vec![seed]);
        let next = store.create(payload("Next", 2)).await.unwrap();
        assert_eq!(next.id.as_str(), "8");
    }
}
