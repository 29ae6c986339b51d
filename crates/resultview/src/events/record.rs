//! Streamed filesystem-event records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::flags::{EventFlags, EventKind};

/// One filesystem change event, immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub path: String,
    pub event_id: u64,
    pub timestamp: u64,
    pub flag_bits: u32,
}

impl EventRecord {
    /// Validates one entry of an inbound event batch.
    ///
    /// Explicit field-presence and type checks; an entry with a missing or
    /// wrongly typed field is dropped, not the batch it arrived in.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let path = object.get("path")?.as_str()?.to_string();
        let event_id = object.get("eventId")?.as_u64()?;
        let timestamp = object.get("timestamp")?.as_u64()?;
        let flag_bits = u32::try_from(object.get("flagBits")?.as_u64()?).ok()?;
        Some(Self {
            path,
            event_id,
            timestamp,
            flag_bits,
        })
    }

    /// Decoded flag bits. Unknown bits are dropped.
    pub fn flags(&self) -> EventFlags {
        EventFlags::from_bits_truncate(self.flag_bits)
    }

    /// Display classification derived from the flag bits.
    pub fn kind(&self) -> EventKind {
        EventKind::classify(self.flags())
    }
}
