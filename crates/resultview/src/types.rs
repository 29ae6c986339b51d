//! Core types shared across the projection layer.
//!
//! These mirror the backend's wire shapes. The backend mints slab indices and
//! owns their meaning; this crate only routes them.

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A compact 32-bit index naming a result item in the backend's slab.
///
/// Opaque to the frontend: equality and hashing only, no arithmetic. The
/// u32::MAX value is reserved as an invalid/sentinel value and is rejected on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SlabIndex(u32);

impl SlabIndex {
    /// Creates a new SlabIndex from a backend-supplied number.
    ///
    /// Returns `None` for values that cannot name a slab slot (>= u32::MAX).
    #[inline]
    pub fn from_raw(value: u64) -> Option<Self> {
        if value >= u32::MAX as u64 {
            None
        } else {
            Some(Self(value as u32))
        }
    }

    /// Returns the raw index value.
    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Serialize for SlabIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SlabIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        if value == u32::MAX {
            return Err(D::Error::custom("SlabIndex cannot be u32::MAX"));
        }
        Ok(Self(value))
    }
}

/// The current search result set: an ordered, possibly sparse sequence of
/// slab indices. `None` marks a position the backend has not resolved yet.
pub type ResultSequence = Vec<Option<SlabIndex>>;

/// Metadata carried by a hydrated row. All fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMetadata {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<u64>,
}

/// One item of a batch-fetch response, positionally aligned with the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowInfo {
    pub path: String,
    #[serde(default)]
    pub metadata: RowMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A fully populated display row.
///
/// Produced only by merging batch-fetch responses and icon patches; the icon
/// never regresses from a non-empty value to an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedRow {
    pub path: String,
    #[serde(default)]
    pub metadata: RowMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
