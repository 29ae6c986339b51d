//! Broadcast bus for the push streams feeding the projection layer.

use serde_json::Value;
use tokio::sync::broadcast;

/// A fan-out channel for one push stream.
///
/// Payloads are whole batches; subscribers that fall behind observe a lag
/// error rather than blocking the publisher.
#[derive(Clone)]
pub struct Bus<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Bus<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn publish(&self, batch: T) -> Result<usize, broadcast::error::SendError<T>> {
        self.sender.send(batch)
    }
}

/// Icon-patch batches: lists of `{slabIndex, icon?}` wire values.
pub type IconPatchBus = Bus<Vec<Value>>;

/// Filesystem-event batches: lists of `{path, eventId, timestamp, flagBits}`
/// wire values.
pub type FsEventBus = Bus<Vec<Value>>;
