// Crate root library declaration and module exports.
pub mod category;
pub mod cli;
pub mod color_utils;
pub mod config;
pub mod context;
pub mod controller;
pub mod model;
pub mod notify;
pub mod storage;
pub mod store;

pub use category::{CategoryId, CategoryRegistry, category_of};
pub use controller::{CalendarController, CalendarView, ControllerError, EditingSession};
pub use model::{DisplayEvent, Event, EventDraft, EventId, EventKind, NewEvent};
pub use store::{DateRange, EventStore, StoreError};
