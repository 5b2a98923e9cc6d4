// File: ./src/model/mod.rs
pub mod codec;
pub mod event;

pub use codec::{decode_duration, decode_event, decode_time, encode_draft, encode_duration, encode_time};
pub use event::{
    DEFAULT_EVENT_COLOR, DisplayEvent, Event, EventDraft, EventId, EventKind, EventPatch, NewEvent,
};
