//! Client-side projection layer for a virtualized search result list.
//!
//! This crate provides the frontend core sitting between an asynchronous
//! search backend and a renderer:
//! - Sparse hydration cache turning slab indices into display rows on demand
//! - Out-of-band icon patching keyed by backend identifier
//! - Bounded buffer of streamed filesystem events with textual/regex filtering
//! - Selection reconciliation across result-set refreshes

pub mod bus;
pub mod error;
pub mod events;
pub mod fetch;
pub mod filter;
pub mod listener;
pub mod loader;
pub mod selection;
pub mod types;

// Re-export main types
pub use bus::{Bus, FsEventBus, IconPatchBus};
pub use error::{Result, ResultViewError};
pub use events::{EventFlags, EventKind, EventRecord, RecentEventBuffer, EVENT_CAPACITY};
pub use fetch::{RowFetcher, SharedFetcher};
pub use filter::{EventFilter, FilterOptions};
pub use listener::{spawn_event_listener, spawn_icon_listener, ListenerHandle};
pub use loader::{IconPatch, RowLoader};
pub use selection::{Selection, SelectionTracker};
pub use types::{HydratedRow, ResultSequence, RowInfo, RowMetadata, SlabIndex};
