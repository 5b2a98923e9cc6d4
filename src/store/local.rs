// File: src/store/local.rs
//! Event store persisted as a JSON file in the data directory.
//!
//! Every operation is a locked read-modify-write of the whole file, run on the
//! blocking pool so the lock wait never stalls the async runtime.
//! Disk and decode failures surface as `StoreError::Network`, the
//! "backend unavailable" class the controller reports to the user.
use super::{DateRange, EventStore, StoreError, StoreResult, validate};
use crate::context::AppContext;
use crate::model::{Event, EventId, EventPatch, NewEvent};
use crate::storage::LocalStorage;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Bump when the on-disk layout of `Event` changes.
const LOCAL_EVENTS_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Default)]
struct LocalEventsData {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct LocalEventStore {
    path: PathBuf,
}

impl LocalEventStore {
    pub fn new(ctx: &dyn AppContext) -> anyhow::Result<Self> {
        Ok(Self {
            path: ctx.get_events_path()?,
        })
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_internal(path: &Path) -> anyhow::Result<LocalEventsData> {
        if !path.exists() {
            return Ok(LocalEventsData {
                version: LOCAL_EVENTS_VERSION,
                ..Default::default()
            });
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data: LocalEventsData = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if data.version > LOCAL_EVENTS_VERSION {
            anyhow::bail!(
                "{} was written by a newer version (v{})",
                path.display(),
                data.version
            );
        }
        Ok(data)
    }

    fn save_internal(path: &Path, data: &LocalEventsData) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        LocalStorage::atomic_write(path, json)
    }

    /// Read-modify-write under the file lock. The closure decides whether
    /// anything needs writing back by returning `Ok((value, dirty))`.
    async fn modify<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut LocalEventsData) -> StoreResult<(T, bool)> + Send + 'static,
    {
        let outcome = tokio::task::spawn_blocking({
            let path = self.path.clone();
            move || Self::modify_blocking(&path, f)
        })
        .await
        .context("Task join error")
        .and_then(|r| r);
        match outcome {
            Ok(result) => result.map(|(value, _)| value),
            Err(e) => {
                log::error!("Local event store failure: {:#}", e);
                Err(StoreError::Network(e.to_string()))
            }
        }
    }

    fn modify_blocking<T, F>(path: &Path, f: F) -> anyhow::Result<StoreResult<(T, bool)>>
    where
        F: FnOnce(&mut LocalEventsData) -> StoreResult<(T, bool)>,
    {
        LocalStorage::with_lock(path, || {
            let mut data = Self::load_internal(path)?;
            let result = f(&mut data);
            if let Ok((_, true)) = &result {
                data.version = LOCAL_EVENTS_VERSION;
                Self::save_internal(path, &data)?;
            }
            Ok(result)
        })
    }
}

#[async_trait]
impl EventStore for LocalEventStore {
    async fn list(&self, range: DateRange) -> StoreResult<Vec<Event>> {
        self.modify(move |data| {
            let mut events: Vec<Event> = data
                .events
                .iter()
                .filter(|e| range.contains(e.start))
                .cloned()
                .collect();
            events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
            Ok((events, false))
        })
        .await
    }

    async fn create(&self, draft: NewEvent) -> StoreResult<Event> {
        validate(&draft)?;
        self.modify(move |data| {
            data.next_id += 1;
            let event = Event::from_new(EventId::new(data.next_id.to_string()), draft);
            data.events.push(event.clone());
            Ok((event, true))
        })
        .await
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> StoreResult<Event> {
        validate(&patch)?;
        let id = id.clone();
        self.modify(move |data| {
            let event = data
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(StoreError::NotFound(id))?;
            event.apply(patch);
            Ok((event.clone(), true))
        })
        .await
    }

    async fn delete(&self, id: &EventId) -> StoreResult<()> {
        let id = id.clone();
        self.modify(move |data| {
            let before = data.events.len();
            data.events.retain(|e| e.id != id);
            if data.events.len() == before {
                return Err(StoreError::NotFound(id));
            }
            Ok(((), true))
        })
        .await
    }
}
