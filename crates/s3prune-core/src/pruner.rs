//! Prune run orchestration: list, classify, delete

use crate::classifier::classify;
use crate::deleter::BatchDeleter;
use crate::lister::ObjectLister;
use crate::report::{count_folders, ObjectSet, PruneEvent, Reporter};
use crate::{PruneConfig, PruneError, RunSummary};
use s3prune_domain::{StorageBackend, MAX_DELETE_BATCH};
use std::time::{Instant, SystemTime};
use tracing::Instrument;
use uuid::Uuid;

/// Runs the prune pipeline for one prefix
///
/// Every call to [`Pruner::run`] is independent: it captures its own
/// reference instant and owns its accumulators.
///
/// # Examples
///
/// ```no_run
/// use s3prune_core::{NullReporter, PruneConfig, Pruner};
/// use s3prune_store::MemoryBackend;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MemoryBackend::new();
/// let pruner = Pruner::new(PruneConfig::new("bucket", "logs/"));
///
/// let summary = pruner.run(&backend, &mut NullReporter).await?;
/// println!("{}", summary.summary());
/// # Ok(())
/// # }
/// ```
pub struct Pruner {
    config: PruneConfig,
}

impl Pruner {
    /// Create a pruner with the given configuration
    pub fn new(config: PruneConfig) -> Self {
        Self { config }
    }

    /// Get the run configuration
    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Run once, aging objects relative to the current time
    pub async fn run<B: StorageBackend>(
        &self,
        backend: &B,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, PruneError> {
        self.run_at(backend, reporter, SystemTime::now()).await
    }

    /// Run once, aging every object relative to `now`
    ///
    /// # Errors
    ///
    /// Fails before any backend call on invalid configuration, and on a
    /// listing failure before anything is deleted. Delete failures never
    /// fail the run; they are counted in the returned summary.
    pub async fn run_at<B: StorageBackend>(
        &self,
        backend: &B,
        reporter: &mut dyn Reporter,
        now: SystemTime,
    ) -> Result<RunSummary, PruneError> {
        self.config.validate()?;

        let run_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "prune",
            %run_id,
            bucket = %self.config.bucket,
            prefix = %self.config.prefix
        );

        self.execute(backend, reporter, now, run_id)
            .instrument(span)
            .await
    }

    async fn execute<B: StorageBackend>(
        &self,
        backend: &B,
        reporter: &mut dyn Reporter,
        now: SystemTime,
        run_id: Uuid,
    ) -> Result<RunSummary, PruneError> {
        let config = &self.config;
        let start = Instant::now();

        tracing::info!(
            max_age = ?config.max_age,
            max_files = config.max_files,
            dry_run = config.dry_run,
            "Searching objects"
        );
        reporter.report(PruneEvent::Started {
            bucket: &config.bucket,
            prefix: &config.prefix,
            max_age: config.max_age,
            max_results: config.max_files,
            dry_run: config.dry_run,
        });

        let listing = ObjectLister::new(backend)
            .with_progress(config.show_progress)
            .list(&config.bucket, &config.prefix, config.max_files, reporter)
            .await?;

        if listing.truncated {
            tracing::warn!(
                max_files = config.max_files,
                "Listing truncated at max files limit, more objects may exist"
            );
            reporter.report(PruneEvent::Truncated {
                max_results: config.max_files,
            });
        }

        let listed = listing.records.len();
        let truncated = listing.truncated;
        let classification = classify(listing.records, now, config.max_age);

        reporter.report(PruneEvent::Removal(ObjectSet::new(
            &classification.remove,
            config.dry_run,
            MAX_DELETE_BATCH,
        )));

        let outcome = BatchDeleter::new(backend)
            .delete(&config.bucket, &classification.remove, config.dry_run, reporter)
            .await;

        reporter.report(PruneEvent::Retention(ObjectSet::new(
            &classification.keep,
            config.dry_run,
            MAX_DELETE_BATCH,
        )));

        let summary = RunSummary {
            run_id,
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
            dry_run: config.dry_run,
            listed,
            truncated,
            removed: classification.remove.len(),
            removed_folders: count_folders(&classification.remove),
            kept: classification.keep.len(),
            kept_folders: count_folders(&classification.keep),
            attempted: outcome.attempted,
            deleted: outcome.deleted_count,
            errored: outcome.error_count,
            batches: outcome.batches,
            failures: outcome.failures,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            removed = summary.removed,
            kept = summary.kept,
            deleted = summary.deleted,
            errored = summary.errored,
            "Prune completed"
        );
        reporter.report(PruneEvent::Finished(&summary));

        Ok(summary)
    }
}
