//! Batched deletion with partial-failure accounting

use crate::report::{count_folders, PruneEvent, Reporter};
use s3prune_domain::{ObjectRecord, StorageBackend, MAX_DELETE_BATCH};
use std::collections::BTreeMap;

/// Result of a single delete call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 1-based batch index
    pub index: usize,

    /// Keys sent in this batch
    pub attempted: usize,

    /// Keys the backend acknowledged
    pub deleted: usize,

    /// Keys not acknowledged (`attempted - deleted`)
    pub errors: usize,

    /// Per-key errors returned by the backend
    pub key_errors: BTreeMap<String, String>,

    /// Set when the call itself failed; every key then counts as an error
    pub transport_error: Option<String>,
}

impl BatchReport {
    /// Whether any key in the batch failed
    pub fn is_failure(&self) -> bool {
        self.errors > 0
    }

    fn failure(&self) -> Option<BatchFailure> {
        if !self.is_failure() {
            return None;
        }

        let message = match (&self.transport_error, self.key_errors.iter().next()) {
            (Some(e), _) => format!("delete call failed: {}", e),
            (None, Some((key, msg))) => format!(
                "{} key(s) failed, first: {}: {}",
                self.errors, key, msg
            ),
            (None, None) => format!("{} key(s) not acknowledged", self.errors),
        };

        Some(BatchFailure {
            batch: self.index,
            key_count: self.attempted,
            failed: self.errors,
            message,
        })
    }
}

/// A batch that had at least one failed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 1-based batch index
    pub batch: usize,
    /// Keys sent in the batch
    pub key_count: usize,
    /// Keys that failed
    pub failed: usize,
    /// Human-readable cause
    pub message: String,
}

/// Aggregate over all batches of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Keys sent across all batches (0 for dry-run or empty input)
    pub attempted: usize,

    /// Keys acknowledged as deleted
    pub deleted_count: usize,

    /// Keys that failed, per-key or through a failed call
    pub error_count: usize,

    /// Number of delete calls issued
    pub batches: usize,

    /// One entry per batch with failures
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Fold one batch into the aggregate
    pub fn record(&mut self, report: &BatchReport) {
        self.attempted += report.attempted;
        self.deleted_count += report.deleted;
        self.error_count += report.errors;
        self.batches += 1;
        if let Some(failure) = report.failure() {
            self.failures.push(failure);
        }
    }
}

/// Split keys into consecutive batches of at most `batch_size`
///
/// `batch_size` is clamped to `1..=MAX_DELETE_BATCH`.
pub fn split_batches(records: &[ObjectRecord], batch_size: usize) -> impl Iterator<Item = &[ObjectRecord]> {
    records.chunks(batch_size.clamp(1, MAX_DELETE_BATCH))
}

/// Issues sequential delete calls against a [`StorageBackend`]
pub struct BatchDeleter<'a, B> {
    backend: &'a B,
}

impl<'a, B: StorageBackend> BatchDeleter<'a, B> {
    /// Create a deleter over `backend`
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Delete every record in `remove`, batch by batch
    ///
    /// A failed batch never stops the remaining ones. In dry-run mode the
    /// backend is never called and a zero outcome is returned.
    pub async fn delete(
        &self,
        bucket: &str,
        remove: &[ObjectRecord],
        dry_run: bool,
        reporter: &mut dyn Reporter,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        if dry_run {
            tracing::info!(
                "DRY RUN: Would delete {} objects from {} folders",
                remove.len(),
                count_folders(remove)
            );
            return outcome;
        }

        if remove.is_empty() {
            return outcome;
        }

        tracing::info!(
            objects = remove.len(),
            batch_size = MAX_DELETE_BATCH,
            "Deleting objects"
        );

        for (i, batch) in split_batches(remove, MAX_DELETE_BATCH).enumerate() {
            let report = self.delete_batch(bucket, i + 1, batch).await;
            outcome.record(&report);
            reporter.report(PruneEvent::BatchCompleted(&report));
        }

        outcome
    }

    async fn delete_batch(&self, bucket: &str, index: usize, batch: &[ObjectRecord]) -> BatchReport {
        let keys: Vec<String> = batch.iter().map(|r| r.key.clone()).collect();
        let attempted = keys.len();

        match self.backend.delete_batch(bucket, &keys).await {
            Ok(result) => {
                let deleted = keys.iter().filter(|k| result.deleted.contains(*k)).count();
                let errors = attempted - deleted;

                for (key, message) in &result.errors {
                    tracing::warn!(batch = index, key = %key, "Failed to delete object: {}", message);
                }
                let unacknowledged = errors.saturating_sub(result.errors.len());
                if unacknowledged > 0 {
                    tracing::warn!(batch = index, unacknowledged, "Backend did not acknowledge every key");
                }

                tracing::debug!(batch = index, attempted, deleted, errors, "Batch completed");

                BatchReport {
                    index,
                    attempted,
                    deleted,
                    errors,
                    key_errors: result.errors,
                    transport_error: None,
                }
            }
            Err(e) => {
                tracing::warn!(batch = index, keys = attempted, "Delete call failed: {}", e);
                BatchReport {
                    index,
                    attempted,
                    deleted: 0,
                    errors: attempted,
                    key_errors: BTreeMap::new(),
                    transport_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use async_trait::async_trait;
    use s3prune_domain::{DeleteReport, ListedObject, ObjectPage};
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    // Records every delete call; can fail whole calls or single keys
    #[derive(Default)]
    struct MockStore {
        calls: Mutex<Vec<Vec<String>>>,
        fail_call: Option<usize>,
        hang_call: Option<usize>,
        reject_keys: BTreeSet<String>,
        drop_keys: BTreeSet<String>,
    }

    #[async_trait]
    impl StorageBackend for MockStore {
        type Error = String;

        async fn list_page(
            &self,
            _bucket: &str,
            _prefix: &str,
            _page_size: usize,
            _continuation: Option<String>,
        ) -> Result<ObjectPage, Self::Error> {
            Ok(ObjectPage::default())
        }

        async fn delete_batch(&self, _bucket: &str, keys: &[String]) -> Result<DeleteReport, Self::Error> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(keys.to_vec());
                calls.len()
            };
            if self.fail_call == Some(call) {
                return Err("connection reset".to_string());
            }
            if self.hang_call == Some(call) {
                std::future::pending::<()>().await;
            }

            let mut report = DeleteReport::default();
            for key in keys {
                if self.reject_keys.contains(key) {
                    report.errors.insert(key.clone(), "AccessDenied".to_string());
                } else if !self.drop_keys.contains(key) {
                    report.deleted.insert(key.clone());
                }
            }
            Ok(report)
        }
    }

    fn records(n: usize) -> Vec<ObjectRecord> {
        (0..n)
            .map(|i| ObjectRecord::new("bucket", ListedObject::new(format!("k/{:05}", i), SystemTime::UNIX_EPOCH)))
            .collect()
    }

    #[derive(Default)]
    struct BatchLog(Vec<BatchReport>);

    impl Reporter for BatchLog {
        fn report(&mut self, event: PruneEvent<'_>) {
            if let PruneEvent::BatchCompleted(report) = event {
                self.0.push(report.clone());
            }
        }
    }

    #[test]
    fn test_split_batches_sizes() {
        let input = records(2500);
        let sizes: Vec<usize> = split_batches(&input, MAX_DELETE_BATCH).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
    }

    #[test]
    fn test_split_batches_clamps_to_provider_limit() {
        let input = records(2001);
        assert!(split_batches(&input, 5000).all(|b| b.len() <= MAX_DELETE_BATCH));
        assert_eq!(split_batches(&input, 0).count(), 2001);
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_backend() {
        let store = MockStore::default();
        let outcome = BatchDeleter::new(&store)
            .delete("bucket", &records(1500), true, &mut NullReporter)
            .await;

        assert_eq!(outcome, BatchOutcome::default());
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_remove_set_never_calls_backend() {
        let store = MockStore::default();
        let outcome = BatchDeleter::new(&store)
            .delete("bucket", &[], false, &mut NullReporter)
            .await;

        assert_eq!(outcome.attempted, 0);
        assert_eq!(outcome.batches, 0);
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let store = MockStore::default();
        let input = records(2500);
        let outcome = BatchDeleter::new(&store)
            .delete("bucket", &input, false, &mut NullReporter)
            .await;

        let calls = store.calls.lock().unwrap();
        let sent: Vec<String> = calls.iter().flatten().cloned().collect();
        let expected: Vec<String> = input.iter().map(|r| r.key.clone()).collect();

        assert_eq!(calls.len(), 3);
        assert_eq!(sent, expected);
        assert_eq!(outcome.attempted, 2500);
        assert_eq!(outcome.deleted_count, 2500);
        assert_eq!(outcome.error_count, 0);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_abort_remaining_batches() {
        let store = MockStore {
            fail_call: Some(2),
            ..Default::default()
        };
        let mut log = BatchLog::default();
        let outcome = BatchDeleter::new(&store)
            .delete("bucket", &records(2500), false, &mut log)
            .await;

        assert_eq!(store.calls.lock().unwrap().len(), 3);
        assert_eq!(outcome.attempted, 2500);
        assert_eq!(outcome.deleted_count, 1500);
        assert_eq!(outcome.error_count, 1000);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].batch, 2);
        assert_eq!(outcome.failures[0].key_count, 1000);
        assert!(outcome.failures[0].message.contains("connection reset"));

        let sizes: Vec<(usize, usize)> = log.0.iter().map(|r| (r.index, r.attempted)).collect();
        assert_eq!(sizes, vec![(1, 1000), (2, 1000), (3, 500)]);
        assert!(log.0[1].transport_error.is_some());
    }

    #[tokio::test]
    async fn test_dropped_run_issues_no_further_batches() {
        let store = MockStore {
            hang_call: Some(2),
            ..Default::default()
        };
        let input = records(2500);
        let mut log = BatchLog::default();

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            BatchDeleter::new(&store).delete("bucket", &input, false, &mut log),
        )
        .await;

        assert!(result.is_err());
        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].first().map(String::as_str), Some("k/00000"));
        assert_eq!(calls[1].first().map(String::as_str), Some("k/01000"));

        // Only the first batch completed before the run was dropped
        let completed: Vec<(usize, usize)> = log.0.iter().map(|r| (r.index, r.deleted)).collect();
        assert_eq!(completed, vec![(1, 1000)]);
    }

    #[tokio::test]
    async fn test_per_key_errors_counted() {
        let store = MockStore {
            reject_keys: ["k/00001".to_string(), "k/00003".to_string()].into_iter().collect(),
            drop_keys: ["k/00004".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let outcome = BatchDeleter::new(&store)
            .delete("bucket", &records(5), false, &mut NullReporter)
            .await;

        assert_eq!(outcome.attempted, 5);
        assert_eq!(outcome.deleted_count, 2);
        assert_eq!(outcome.error_count, 3);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].message.contains("AccessDenied"));
    }
}
