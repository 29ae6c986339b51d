//! Stream listeners binding the push buses to their consumers.
//!
//! Each spawn returns a handle whose `unsubscribe` is idempotent and
//! guarantees no further consumer mutation afterwards: the closed flag is
//! checked before every batch application, not just on task abort.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::bus::Bus;
use crate::events::RecentEventBuffer;
use crate::loader::{IconPatch, RowLoader};

/// Handle to a spawned stream listener.
pub struct ListenerHandle {
    closed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Stops the listener. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Routes icon-patch batches from the bus into the loader.
pub fn spawn_icon_listener(bus: &Bus<Vec<Value>>, loader: Arc<RowLoader>) -> ListenerHandle {
    let mut receiver = bus.subscribe();
    let closed = Arc::new(AtomicBool::new(false));
    let closed_in_task = closed.clone();
    let task = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(batch) => {
                    if closed_in_task.load(Ordering::SeqCst) {
                        break;
                    }
                    let patches = batch
                        .iter()
                        .filter_map(IconPatch::from_value)
                        .collect::<Vec<_>>();
                    if !patches.is_empty() {
                        loader.apply_icon_patches(&patches);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("icon patch listener lagged, skipped {skipped} batches");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    ListenerHandle { closed, task }
}

/// Routes filesystem-event batches from the bus into the buffer.
pub fn spawn_event_listener(
    bus: &Bus<Vec<Value>>,
    buffer: Arc<RecentEventBuffer>,
) -> ListenerHandle {
    let mut receiver = bus.subscribe();
    let closed = Arc::new(AtomicBool::new(false));
    let closed_in_task = closed.clone();
    let task = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(batch) => {
                    if closed_in_task.load(Ordering::SeqCst) {
                        break;
                    }
                    buffer.ingest_batch(&batch);
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("event listener lagged, skipped {skipped} batches");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    ListenerHandle { closed, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::fetch::RowFetcher;
    use crate::filter::FilterOptions;
    use crate::types::{RowInfo, SlabIndex};
    use async_trait::async_trait;
    use tokio::time::{sleep, Duration};

    struct StaticFetcher;

    #[async_trait]
    impl RowFetcher for StaticFetcher {
        async fn fetch_rows(&self, indices: &[SlabIndex]) -> Result<Vec<RowInfo>> {
            Ok(indices
                .iter()
                .map(|slab| RowInfo {
                    path: format!("/{}", slab.get()),
                    ..RowInfo::default()
                })
                .collect())
        }
    }

    async fn settle<F: Fn() -> bool>(done: F) {
        for _ in 0..50 {
            if done() {
                return;
            }
            sleep(Duration::from_millis(2)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn icon_listener_applies_valid_patches() {
        let bus = Bus::new(8);
        let loader = Arc::new(RowLoader::new(Arc::new(StaticFetcher)));
        loader.set_results(vec![SlabIndex::from_raw(1)]);
        loader.ensure_range_loaded(0, 0).await;

        let handle = spawn_icon_listener(&bus, loader.clone());
        bus.publish(vec![
            serde_json::json!({ "slabIndex": 1, "icon": "img" }),
            serde_json::json!({ "bogus": true }),
        ])
        .expect("publish");

        settle(|| loader.get(0).and_then(|row| row.icon).is_some()).await;
        assert_eq!(loader.get(0).expect("row").icon.as_deref(), Some("img"));
        handle.unsubscribe();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn event_listener_feeds_the_buffer() {
        let bus = Bus::new(8);
        let buffer = Arc::new(RecentEventBuffer::new());
        let handle = spawn_event_listener(&bus, buffer.clone());

        bus.publish(vec![serde_json::json!({
            "path": "/tmp/a",
            "eventId": 1,
            "timestamp": 1,
            "flagBits": 0u64,
        })])
        .expect("publish");

        settle(|| !buffer.is_empty()).await;
        assert_eq!(buffer.filter("", &FilterOptions::default()).len(), 1);
        handle.unsubscribe();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unsubscribe_is_idempotent_and_stops_ingestion() {
        let bus = Bus::new(8);
        let buffer = Arc::new(RecentEventBuffer::new());
        let handle = spawn_event_listener(&bus, buffer.clone());

        handle.unsubscribe();
        handle.unsubscribe();
        assert!(handle.is_closed());

        // Published after teardown; the buffer must stay untouched.
        let _ = bus.publish(vec![serde_json::json!({
            "path": "/tmp/a",
            "eventId": 1,
            "timestamp": 1,
            "flagBits": 0u64,
        })]);
        sleep(Duration::from_millis(20)).await;
        assert!(buffer.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropping_the_handle_unsubscribes() {
        let bus = Bus::new(8);
        let buffer = Arc::new(RecentEventBuffer::new());
        drop(spawn_event_listener(&bus, buffer.clone()));

        let _ = bus.publish(vec![serde_json::json!({
            "path": "/tmp/a",
            "eventId": 1,
            "timestamp": 1,
            "flagBits": 0u64,
        })]);
        sleep(Duration::from_millis(20)).await;
        assert!(buffer.is_empty());
    }
}
