//! Paginated listing with a hard result cap

use crate::report::{PruneEvent, Reporter};
use crate::PruneError;
use s3prune_domain::{ObjectPage, ObjectRecord, StorageBackend, MAX_PAGE_SIZE};

/// Records collected by a listing, in backend order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingResult {
    /// Unclassified records
    pub records: Vec<ObjectRecord>,

    /// True iff the cap was reached while the backend still had objects
    ///
    /// Callers must not assume the listing is complete when this is set.
    pub truncated: bool,
}

/// Drives pagination against a [`StorageBackend`]
///
/// Stops as soon as the cap is reached, even in the middle of a page.
pub struct ObjectLister<'a, B> {
    backend: &'a B,
    progress: bool,
}

impl<'a, B: StorageBackend> ObjectLister<'a, B> {
    /// Create a lister without progress events
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            progress: false,
        }
    }

    /// Enable or disable per-page progress events
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// List up to `max_results` objects under `prefix`
    ///
    /// # Errors
    ///
    /// Returns [`PruneError::Config`] if `max_results` is zero and
    /// [`PruneError::Backend`] if any page request fails. Records collected
    /// before a failure are discarded.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        max_results: usize,
        reporter: &mut dyn Reporter,
    ) -> Result<ListingResult, PruneError> {
        if max_results == 0 {
            return Err(PruneError::Config("max results must be greater than zero".into()));
        }

        let page_size = max_results.min(MAX_PAGE_SIZE);
        let mut records = Vec::with_capacity(page_size);
        let mut continuation = None;
        let mut page = 0;

        loop {
            page += 1;

            let ObjectPage {
                objects,
                next_continuation,
            } = self
                .backend
                .list_page(bucket, prefix, page_size, continuation.take())
                .await
                .map_err(|e| {
                    tracing::error!(page, bucket, prefix, "Failed to list page: {}", e);
                    PruneError::Backend {
                        page,
                        message: e.to_string(),
                    }
                })?;

            let available = objects.len();
            let taken = available.min(max_results - records.len());
            records.extend(
                objects
                    .into_iter()
                    .take(taken)
                    .map(|object| ObjectRecord::new(bucket, object)),
            );

            tracing::debug!(page, received = available, fetched = records.len(), "Listed page");

            if self.progress {
                reporter.report(PruneEvent::PageFetched {
                    page,
                    fetched: records.len(),
                });
            }

            if records.len() >= max_results {
                let truncated = taken < available || next_continuation.is_some();
                return Ok(ListingResult { records, truncated });
            }

            match next_continuation {
                Some(token) => continuation = Some(token),
                None => {
                    return Ok(ListingResult {
                        records,
                        truncated: false,
                    })
                }
            }
        }
    }
}
