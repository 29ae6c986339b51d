//! Sparse hydration cache for virtualized search results.
//!
//! The backend hands the frontend a flat sequence of slab indices; full row
//! data is fetched lazily for visible ranges and merged with icon patches
//! that arrive out of band. Three pieces keep this consistent under rapid
//! query refinement:
//!
//! - an epoch counter bumped on every result-sequence replacement: a fetch
//!   that completes under a different epoch is discarded wholesale
//! - an in-flight set preventing duplicate requests for the same position
//!   from overlapping callers
//! - a reverse index (slab index -> display position) routing icon patches,
//!   rebuilt per epoch so patches for superseded result sets fail to resolve
//!
//! All state lives behind one mutex that is never held across an await, so
//! the four-step epoch transition (bump, clear in-flight, clear cache,
//! rebuild reverse index) is atomic with respect to fetch completions.

use fnv::{FnvHashMap, FnvHashSet};
use parking_lot::Mutex;
use serde_json::Value;

use crate::fetch::SharedFetcher;
use crate::types::{HydratedRow, ResultSequence, RowInfo, SlabIndex};

/// An inbound icon update for a single slab index.
#[derive(Debug, Clone, PartialEq)]
pub struct IconPatch {
    pub slab_index: SlabIndex,
    pub icon: Option<String>,
}

impl IconPatch {
    /// Validates one entry of an icon-patch batch.
    ///
    /// Entries without a numeric `slabIndex` are dropped; a missing or
    /// non-string `icon` yields a patch carrying no icon.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let slab_index = SlabIndex::from_raw(object.get("slabIndex")?.as_u64()?)?;
        let icon = object
            .get("icon")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self { slab_index, icon })
    }
}

#[derive(Default)]
struct LoaderState {
    epoch: u64,
    results: ResultSequence,
    cache: FnvHashMap<usize, HydratedRow>,
    reverse: FnvHashMap<SlabIndex, usize>,
    in_flight: FnvHashSet<usize>,
    /// Icons patched in before their position was hydrated. Consulted when
    /// the fetch response lands, cleared on every epoch transition.
    pending_icons: FnvHashMap<usize, String>,
}

impl LoaderState {
    fn rebuild_reverse_index(&mut self) {
        self.reverse.clear();
        for (position, slab) in self.results.iter().enumerate() {
            if let Some(slab) = slab {
                self.reverse.insert(*slab, position);
            }
        }
    }
}

/// Position-keyed cache of hydrated rows with lazy, deduplicated loading.
pub struct RowLoader {
    fetcher: SharedFetcher,
    state: Mutex<LoaderState>,
}

impl std::fmt::Debug for RowLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RowLoader")
            .field("epoch", &state.epoch)
            .field("results", &state.results.len())
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl RowLoader {
    pub fn new(fetcher: SharedFetcher) -> Self {
        Self {
            fetcher,
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Replaces the result sequence, invalidating all pending hydration work.
    ///
    /// Bumps the epoch, clears the in-flight set and the cache, and rebuilds
    /// the reverse index, all under one lock acquisition. Any fetch that was
    /// issued before this call observes the epoch mismatch on completion and
    /// discards its response.
    pub fn set_results(&self, results: ResultSequence) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.in_flight.clear();
        state.cache.clear();
        state.pending_icons.clear();
        state.results = results;
        state.rebuild_reverse_index();
    }

    /// Current epoch. Advances by one per `set_results` call.
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Length of the current result sequence.
    pub fn len(&self) -> usize {
        self.state.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().results.is_empty()
    }

    /// Returns the cached row at a display position. Never triggers loading.
    pub fn get(&self, position: usize) -> Option<HydratedRow> {
        self.state.lock().cache.get(&position).cloned()
    }

    /// Returns the slab index at a display position, if resolved.
    pub fn slab_at(&self, position: usize) -> Option<SlabIndex> {
        self.state.lock().results.get(position).copied().flatten()
    }

    /// Whether a fetch covering the position is currently in flight.
    pub fn is_loading(&self, position: usize) -> bool {
        self.state.lock().in_flight.contains(&position)
    }

    /// Requests hydration for every position in `[start, end]` that is in
    /// bounds, backed by a resolved slab index, not cached, and not already
    /// in flight.
    ///
    /// Issues at most one batched fetch for the deduplicated work set; a
    /// no-op when the set is empty. Failures are logged and release the
    /// in-flight markers so the caller can re-request on the next visible
    /// range computation.
    pub async fn ensure_range_loaded(&self, start: usize, end: usize) {
        let (epoch_at_request, positions, indices) = {
            let mut state = self.state.lock();
            let total = state.results.len();
            if total == 0 || end < start || start >= total {
                return;
            }

            let mut positions = Vec::new();
            let mut indices = Vec::new();
            for position in start..=end.min(total - 1) {
                if state.cache.contains_key(&position) || state.in_flight.contains(&position) {
                    continue;
                }
                let Some(slab) = state.results[position] else {
                    continue;
                };
                positions.push(position);
                indices.push(slab);
                state.in_flight.insert(position);
            }
            (state.epoch, positions, indices)
        };

        if positions.is_empty() {
            return;
        }

        match self.fetcher.fetch_rows(&indices).await {
            Ok(rows) => {
                let mut state = self.state.lock();
                if state.epoch != epoch_at_request {
                    // The sequence was replaced while the fetch was in
                    // flight. The transition already emptied the in-flight
                    // set; any marker present now was planted by a request
                    // from the successor epoch and must survive.
                    return;
                }
                for (slot, position) in positions.iter().enumerate() {
                    if let Some(info) = rows.get(slot) {
                        let merged = merge_fetched(&mut state, *position, info.clone());
                        state.cache.insert(*position, merged);
                    }
                    state.in_flight.remove(position);
                }
            }
            Err(error) => {
                let mut state = self.state.lock();
                if state.epoch == epoch_at_request {
                    for position in &positions {
                        state.in_flight.remove(position);
                    }
                }
                log::warn!(
                    "row fetch failed for {} positions: {error}",
                    positions.len()
                );
            }
        }
    }

    /// Applies a batch of identifier-keyed icon patches.
    ///
    /// Patches whose slab index is absent from the current sequence refer to
    /// a superseded result set and are dropped silently. A patch carrying no
    /// icon never erases a cached one. Returns the number of positions whose
    /// observable icon actually changed, so callers can skip redundant
    /// re-renders.
    pub fn apply_icon_patches(&self, patches: &[IconPatch]) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut changed = 0usize;
        for patch in patches {
            let Some(&position) = state.reverse.get(&patch.slab_index) else {
                continue;
            };
            let Some(icon) = normalize_icon(patch.icon.clone()) else {
                continue;
            };
            match state.cache.get_mut(&position) {
                Some(row) => {
                    if row.icon.as_deref() != Some(icon.as_str()) {
                        row.icon = Some(icon);
                        changed += 1;
                    }
                }
                None => {
                    if state.pending_icons.get(&position).map(String::as_str)
                        != Some(icon.as_str())
                    {
                        state.pending_icons.insert(position, icon);
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}

/// Merges a fetch response item with icon state learned earlier.
///
/// A non-empty fetched icon is authoritative; an empty one defers to the
/// icon already learned for the position, whether it came from a previous
/// hydration or an early patch.
fn merge_fetched(state: &mut LoaderState, position: usize, info: RowInfo) -> HydratedRow {
    let fetched_icon = normalize_icon(info.icon);
    let icon = match fetched_icon {
        Some(icon) => {
            state.pending_icons.remove(&position);
            Some(icon)
        }
        None => state
            .cache
            .get(&position)
            .and_then(|row| row.icon.clone())
            .or_else(|| state.pending_icons.remove(&position)),
    };
    HydratedRow {
        path: info.path,
        metadata: info.metadata,
        icon,
    }
}

/// Treats empty strings as "no icon" so they can never clobber a real one.
fn normalize_icon(icon: Option<String>) -> Option<String> {
    icon.filter(|icon| !icon.is_empty())
}
