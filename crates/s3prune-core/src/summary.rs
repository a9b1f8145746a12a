//! Run-level aggregates handed to the reporter

use crate::BatchFailure;
use std::time::Duration;
use uuid::Uuid;

/// Counts collected over one prune run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique id of this run (UUIDv7, time-ordered)
    pub run_id: Uuid,

    /// Bucket that was pruned
    pub bucket: String,

    /// Key prefix filter
    pub prefix: String,

    /// Whether deletion was simulated
    pub dry_run: bool,

    /// Objects returned by the listing
    pub listed: usize,

    /// Listing stopped at the cap; more objects may exist
    pub truncated: bool,

    /// Objects selected for removal
    pub removed: usize,

    /// Distinct folders among removed objects
    pub removed_folders: usize,

    /// Objects kept
    pub kept: usize,

    /// Distinct folders among kept objects
    pub kept_folders: usize,

    /// Keys sent to the backend for deletion
    pub attempted: usize,

    /// Keys acknowledged as deleted
    pub deleted: usize,

    /// Keys that failed to delete
    pub errored: usize,

    /// Delete calls issued
    pub batches: usize,

    /// Batches with at least one failed key
    pub failures: Vec<BatchFailure>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether any deletion failed
    pub fn has_failures(&self) -> bool {
        self.errored > 0
    }

    /// Generate a plain-text summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Prune Summary".to_string(),
            "=============".to_string(),
            format!("Run: {}", self.run_id),
            format!("Target: s3://{}/{}", self.bucket, self.prefix),
            format!("Dry run: {}", self.dry_run),
            format!("Listed: {}{}", self.listed, if self.truncated { " (truncated)" } else { "" }),
            format!("Removed: {} in {} folders", self.removed, self.removed_folders),
            format!("Kept: {} in {} folders", self.kept, self.kept_folders),
        ];

        if !self.dry_run {
            lines.push(format!(
                "Deleted: {} of {} in {} batches, {} error(s)",
                self.deleted, self.attempted, self.batches, self.errored
            ));
        }

        for failure in &self.failures {
            lines.push(format!(
                "  batch {} ({} keys, {} failed): {}",
                failure.batch, failure.key_count, failure.failed, failure.message
            ));
        }

        lines.push(format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()));
        lines.join("\n")
    }
}
