//! Recent filesystem-event handling.
//!
//! This module owns the streamed-event side of the projection layer:
//! - Structural validation of inbound event batches
//! - Flag-bit decoding and event-kind classification
//! - A bounded, append-only buffer with memoized filtering

mod buffer;
mod flags;
mod record;

pub use buffer::{RecentEventBuffer, EVENT_CAPACITY};
pub use flags::{EventFlags, EventKind};
pub use record::EventRecord;
