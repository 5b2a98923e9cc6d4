// File: src/controller.rs
//! Central logic controller for the calendar.
//!
//! Owns the loaded events, the selected date, category visibility and the
//! event form session. Presentation code reads from it and sends every user
//! action through it.
//!
//! Mutations are fire-and-wait-then-refresh: the store is called, and on
//! success the whole collection is reloaded from `list()`. The collection is
//! never patched from a create/update response, so it always mirrors a
//! snapshot the store confirmed.
use crate::category::{CategoryId, CategoryRegistry};
use crate::config::Config;
use crate::model::{DisplayEvent, EventDraft, EventId, decode_event, encode_draft};
use crate::notify::{Notification, Notifier};
use crate::store::{DateRange, EventStore, StoreError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Event {0} is not loaded")]
    UnknownEvent(EventId),

    #[error("No event form is open")]
    NoSession,
}

/// State of the event form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditingSession {
    #[default]
    Absent,
    Create {
        default_date: Option<NaiveDate>,
        /// Last submitted fields, kept when a save fails.
        draft: Option<EventDraft>,
    },
    Edit {
        event: DisplayEvent,
        /// Last submitted fields, kept when a save fails.
        draft: Option<EventDraft>,
    },
}

impl EditingSession {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Id of the event being edited, if any.
    pub fn bound_id(&self) -> Option<&EventId> {
        match self {
            Self::Edit { event, .. } => Some(&event.id),
            _ => None,
        }
    }

    /// The draft from the last submit attempt of this session.
    pub fn draft(&self) -> Option<&EventDraft> {
        match self {
            Self::Absent => None,
            Self::Create { draft, .. } | Self::Edit { draft, .. } => draft.as_ref(),
        }
    }

    /// Fields to pre-fill the form with: the last submitted draft, else the
    /// edited event, else a blank form on the default date (or `fallback`).
    pub fn initial_draft(&self, fallback: NaiveDate) -> Option<EventDraft> {
        match self {
            Self::Absent => None,
            Self::Create {
                default_date,
                draft,
            } => Some(
                draft
                    .clone()
                    .unwrap_or_else(|| EventDraft::new("", default_date.unwrap_or(fallback))),
            ),
            Self::Edit { event, draft } => Some(
                draft
                    .clone()
                    .unwrap_or_else(|| EventDraft::from_event(event)),
            ),
        }
    }

    fn set_draft(&mut self, submitted: EventDraft) {
        match self {
            Self::Absent => {}
            Self::Create { draft, .. } | Self::Edit { draft, .. } => *draft = Some(submitted),
        }
    }
}

/// Everything the presentation layer renders, taken under one lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    pub selected_date: NaiveDate,
    pub events: Vec<DisplayEvent>,
    pub session: EditingSession,
    pub visible_categories: Vec<CategoryId>,
}

#[derive(Debug)]
struct CalendarState {
    selected_date: NaiveDate,
    events: Vec<DisplayEvent>,
    registry: CategoryRegistry,
    session: EditingSession,
    /// Bumped on every open so late results can tell their session apart.
    session_seq: u64,
    refresh_issued: u64,
    refresh_applied: u64,
}

impl CalendarState {
    fn visible(&self) -> impl Iterator<Item = &DisplayEvent> {
        self.events
            .iter()
            .filter(|e| self.registry.shows_kind(e.kind))
    }
}

#[derive(Clone)]
pub struct CalendarController {
    state: Arc<Mutex<CalendarState>>,
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    range: DateRange,
}

impl std::fmt::Debug for CalendarController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarController")
            .field("store", &self.store)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl CalendarController {
    pub fn new(
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        registry: CategoryRegistry,
        range: DateRange,
        today: NaiveDate,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(CalendarState {
                selected_date: today,
                events: Vec::new(),
                registry,
                session: EditingSession::Absent,
                session_seq: 0,
                refresh_issued: 0,
                refresh_applied: 0,
            })),
            store,
            notifier,
            range,
        }
    }

    /// Build with hidden categories and load window taken from `config`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        today: NaiveDate,
    ) -> Self {
        Self::new(
            store,
            notifier,
            config.category_registry(),
            config.date_range(today),
            today,
        )
    }

    // --- Reads ---

    pub async fn selected_date(&self) -> NaiveDate {
        self.state.lock().await.selected_date
    }

    /// Loaded events whose category is visible, ordered by start.
    pub async fn visible_events(&self) -> Vec<DisplayEvent> {
        let st = self.state.lock().await;
        sorted(st.visible().cloned().collect())
    }

    pub async fn events_on(&self, date: NaiveDate) -> Vec<DisplayEvent> {
        let st = self.state.lock().await;
        sorted(st.visible().filter(|e| e.date == date).cloned().collect())
    }

    pub async fn selected_day_events(&self) -> Vec<DisplayEvent> {
        let date = self.selected_date().await;
        self.events_on(date).await
    }

    pub async fn session(&self) -> EditingSession {
        self.state.lock().await.session.clone()
    }

    pub async fn is_category_visible(&self, id: CategoryId) -> bool {
        self.state.lock().await.registry.is_visible(id)
    }

    pub async fn visible_categories(&self) -> Vec<CategoryId> {
        self.state.lock().await.registry.visible()
    }

    pub async fn view(&self) -> CalendarView {
        let st = self.state.lock().await;
        CalendarView {
            selected_date: st.selected_date,
            events: sorted(st.visible().cloned().collect()),
            session: st.session.clone(),
            visible_categories: st.registry.visible(),
        }
    }

    // --- Local state ---

    pub async fn select_date(&self, date: NaiveDate) {
        self.state.lock().await.selected_date = date;
    }

    pub async fn open_create(&self, default_date: Option<NaiveDate>) {
        let mut st = self.state.lock().await;
        st.session_seq += 1;
        st.session = EditingSession::Create {
            default_date,
            draft: None,
        };
        log::debug!("Opened create form (session {})", st.session_seq);
    }

    /// Open the form on a loaded event.
    pub async fn open_edit(&self, id: &EventId) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let event = st
            .events
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownEvent(id.clone()))?;
        st.session_seq += 1;
        st.session = EditingSession::Edit { event, draft: None };
        log::debug!("Opened edit form for {} (session {})", id, st.session_seq);
        Ok(())
    }

    pub async fn cancel(&self) {
        let mut st = self.state.lock().await;
        if st.session.is_open() {
            log::debug!("Closed form (session {})", st.session_seq);
        }
        st.session = EditingSession::Absent;
    }

    pub async fn toggle_category(&self, id: CategoryId, visible: bool) {
        let mut st = self.state.lock().await;
        st.registry.set_visibility(id, visible);
        log::debug!("Category {} visible={}", id, visible);
    }

    // --- Store-backed operations ---

    /// Reload the collection from the store.
    ///
    /// Returns `Ok(false)` when a refresh started later has already been
    /// applied, in which case this result is dropped.
    pub async fn refresh(&self) -> Result<bool, ControllerError> {
        let token = {
            let mut st = self.state.lock().await;
            st.refresh_issued += 1;
            st.refresh_issued
        };

        let events = match self.store.list(self.range).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Failed to load events (refresh {}): {}", token, e);
                return Err(e.into());
            }
        };

        let mut seen = HashSet::new();
        let decoded: Vec<DisplayEvent> = events
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.id.clone());
                if !fresh {
                    log::warn!("Store returned duplicate event id {}", e.id);
                }
                fresh
            })
            .map(decode_event)
            .collect();

        let mut st = self.state.lock().await;
        if token <= st.refresh_applied {
            log::debug!(
                "Dropping stale refresh {} (already applied {})",
                token,
                st.refresh_applied
            );
            return Ok(false);
        }
        st.refresh_applied = token;
        st.events = decoded;
        log::debug!("Refresh {} loaded {} events", token, st.events.len());
        Ok(true)
    }

    /// Submit the open form. Updates when editing, creates otherwise.
    ///
    /// On failure the session stays open with `draft` attached and the
    /// collection is untouched.
    pub async fn save(&self, draft: EventDraft) -> Result<EventId, ControllerError> {
        let (seq, bound) = {
            let mut st = self.state.lock().await;
            if !st.session.is_open() {
                return Err(ControllerError::NoSession);
            }
            st.session.set_draft(draft.clone());
            (st.session_seq, st.session.bound_id().cloned())
        };

        let payload = encode_draft(&draft);
        let (result, verb) = match &bound {
            Some(id) => (self.store.update(id, payload).await, "update"),
            None => (self.store.create(payload).await, "create"),
        };

        let saved = match result {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Failed to {} event: {}", verb, e);
                self.notifier
                    .notify(Notification::error(format!("Failed to {} event: {}", verb, e)));
                return Err(e.into());
            }
        };

        log::info!("Saved event {} ({})", saved.id, verb);
        {
            let mut st = self.state.lock().await;
            if st.session_seq == seq {
                st.session = EditingSession::Absent;
            } else {
                log::debug!("Form changed while saving, leaving session {} open", st.session_seq);
            }
        }
        self.refresh_after_mutation().await;
        self.notifier.notify(Notification::success(match bound {
            Some(_) => "Event updated",
            None => "Event created",
        }));
        Ok(saved.id)
    }

    /// Delete an event. An id the store no longer knows counts as deleted.
    pub async fn remove(&self, id: &EventId) -> Result<(), ControllerError> {
        match self.store.delete(id).await {
            Ok(()) => log::info!("Deleted event {}", id),
            Err(StoreError::NotFound(_)) => log::info!("Event {} was already deleted", id),
            Err(e) => {
                log::warn!("Failed to delete event {}: {}", id, e);
                self.notifier
                    .notify(Notification::error(format!("Failed to delete event: {}", e)));
                return Err(e.into());
            }
        }

        {
            let mut st = self.state.lock().await;
            if st.session.bound_id() == Some(id) {
                st.session = EditingSession::Absent;
            }
        }
        self.refresh_after_mutation().await;
        self.notifier.notify(Notification::success("Event deleted"));
        Ok(())
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            log::warn!("Event list may be stale after a successful change: {}", e);
        }
    }
}

fn sorted(mut events: Vec<DisplayEvent>) -> Vec<DisplayEvent> {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    events
}
