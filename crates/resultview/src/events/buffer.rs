//! Bounded, append-only buffer of recent filesystem events.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::record::EventRecord;
use crate::filter::{EventFilter, FilterOptions};

/// Maximum number of buffered events. Oldest entries are evicted first.
pub const EVENT_CAPACITY: usize = 10_000;

#[derive(Default)]
struct BufferState {
    events: VecDeque<EventRecord>,
    /// Bumped on every mutating ingest; keys the filter memo.
    generation: u64,
}

struct FilterMemo {
    generation: u64,
    query: String,
    options: FilterOptions,
    result: Arc<[EventRecord]>,
}

/// Capacity-bounded FIFO of streamed filesystem events with memoized
/// filtering.
///
/// Ingestion preserves batch-internal order and inter-batch arrival order.
/// Filtering is a pure projection; the last computed projection is cached on
/// (buffer generation, query, options) so repeated renders with an unchanged
/// buffer do not re-scan.
pub struct RecentEventBuffer {
    state: Mutex<BufferState>,
    memo: Mutex<Option<FilterMemo>>,
}

impl Default for RecentEventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentEventBuffer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BufferState::default()),
            memo: Mutex::new(None),
        }
    }

    /// Ingests a wire batch, dropping structurally invalid entries
    /// individually. Returns the number of records accepted.
    pub fn ingest_batch(&self, batch: &[Value]) -> usize {
        let records = batch
            .iter()
            .filter_map(EventRecord::from_value)
            .collect::<Vec<_>>();
        let accepted = records.len();
        self.ingest_records(records);
        accepted
    }

    /// Appends already-validated records, evicting from the front once the
    /// buffer would exceed [`EVENT_CAPACITY`].
    pub fn ingest_records(&self, records: Vec<EventRecord>) {
        if records.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        state.events.extend(records);
        while state.events.len() > EVENT_CAPACITY {
            state.events.pop_front();
        }
        state.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    /// Returns the buffered events whose path or leaf name matches the
    /// query, oldest first. Empty queries and invalid regex patterns return
    /// the full buffer (fail-open).
    pub fn filter(&self, query: &str, options: &FilterOptions) -> Arc<[EventRecord]> {
        // Lock order is always state before memo.
        let state = self.state.lock();
        let generation = state.generation;

        {
            let memo = self.memo.lock();
            if let Some(memo) = memo.as_ref() {
                if memo.generation == generation
                    && memo.query == query
                    && memo.options == *options
                {
                    return memo.result.clone();
                }
            }
        }

        let matcher = EventFilter::compile(query, options);
        let result: Arc<[EventRecord]> = state
            .events
            .iter()
            .filter(|event| matcher.matches(&event.path))
            .cloned()
            .collect();
        drop(state);

        *self.memo.lock() = Some(FilterMemo {
            generation,
            query: query.to_string(),
            options: *options,
            result: result.clone(),
        });
        result
    }
}
