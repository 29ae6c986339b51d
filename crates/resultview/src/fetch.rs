//! Batch-fetch collaborator seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RowInfo, SlabIndex};

/// Fetches full row data for a batch of slab indices.
///
/// The response must be positionally aligned with the request:
/// `response[i]` describes `indices[i]`.
#[async_trait]
pub trait RowFetcher: Send + Sync {
    async fn fetch_rows(&self, indices: &[SlabIndex]) -> Result<Vec<RowInfo>>;
}

pub type SharedFetcher = Arc<dyn RowFetcher>;
