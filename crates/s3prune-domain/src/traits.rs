//! Trait definitions for external interactions
//!
//! These traits define the boundary between the pruning pipeline and the
//! object store. Provider implementations live in other crates.

use crate::ListedObject;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

/// Largest page a single listing call may return
pub const MAX_PAGE_SIZE: usize = 1000;

/// Largest number of keys a single delete call may carry
pub const MAX_DELETE_BATCH: usize = 1000;

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Objects in the order the provider returned them
    pub objects: Vec<ListedObject>,

    /// Token for the next page, `None` when the listing is exhausted
    pub next_continuation: Option<String>,
}

/// Per-key result of a delete call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Keys the provider acknowledged as deleted
    pub deleted: BTreeSet<String>,

    /// Keys the provider refused, with its error message
    pub errors: BTreeMap<String, String>,
}

/// Paginated listing and batched deletion against an object store
///
/// Implemented by the infrastructure layer (s3prune-store). Callers issue at
/// most one request at a time.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Error type for transport or authorization failures
    type Error: std::fmt::Display + Send;

    /// Fetch one page of objects whose keys start with `prefix`
    ///
    /// `page_size` never exceeds [`MAX_PAGE_SIZE`]. Pass the previous page's
    /// `next_continuation` to continue a listing.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_size: usize,
        continuation: Option<String>,
    ) -> Result<ObjectPage, Self::Error>;

    /// Delete up to [`MAX_DELETE_BATCH`] keys in a single call
    ///
    /// Returns `Err` only when the call as a whole could not be made; per-key
    /// failures are reported in [`DeleteReport::errors`].
    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<DeleteReport, Self::Error>;
}
