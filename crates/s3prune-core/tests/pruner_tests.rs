//! Integration tests for the prune pipeline
//!
//! These run full list/classify/delete cycles against the in-memory backend
//! with a fixed reference instant.

use s3prune_core::{NullReporter, PruneConfig, PruneError, PruneEvent, Pruner, Reporter};
use s3prune_store::MemoryBackend;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const HOUR: Duration = Duration::from_secs(3600);
const BUCKET: &str = "ci-artifacts";

fn now() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

fn config(prefix: &str) -> PruneConfig {
    PruneConfig {
        max_age: 24 * HOUR,
        ..PruneConfig::new(BUCKET, prefix)
    }
}

/// Records a short label per event, in order
#[derive(Default)]
struct RecordingReporter {
    events: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: PruneEvent<'_>) {
        let label = match event {
            PruneEvent::Started { .. } => "started".to_string(),
            PruneEvent::PageFetched { page, fetched } => format!("page {} {}", page, fetched),
            PruneEvent::Truncated { max_results } => format!("truncated {}", max_results),
            PruneEvent::Removal(set) => format!("removal {}", set.records.len()),
            PruneEvent::BatchCompleted(batch) => {
                format!("batch {} {}/{}", batch.index, batch.deleted, batch.attempted)
            }
            PruneEvent::Retention(set) => format!("retention {}", set.records.len()),
            PruneEvent::Finished(_) => "finished".to_string(),
        };
        self.events.push(label);
    }
}

#[tokio::test]
async fn test_removes_only_expired_objects() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/1.txt", now() - 30 * HOUR);
    backend.insert(BUCKET, "a/2.txt", now() - HOUR);
    backend.insert(BUCKET, "other/3.txt", now() - 48 * HOUR);

    let summary = Pruner::new(config("a/"))
        .run_at(&backend, &mut NullReporter, now())
        .await
        .unwrap();

    assert_eq!(summary.listed, 2);
    assert!(!summary.truncated);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.removed_folders, 1);
    assert_eq!(summary.kept, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.batches, 1);
    assert!(!summary.has_failures());

    assert_eq!(backend.keys(BUCKET), vec!["a/2.txt", "other/3.txt"]);
    assert_eq!(backend.delete_calls(), vec![1]);
}

#[tokio::test]
async fn test_object_at_exact_threshold_is_kept() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/edge.txt", now() - 24 * HOUR);

    let summary = Pruner::new(config("a/"))
        .run_at(&backend, &mut NullReporter, now())
        .await
        .unwrap();

    assert_eq!(summary.removed, 0);
    assert_eq!(summary.kept, 1);
    assert!(backend.delete_calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/1.txt", now() - 30 * HOUR);
    backend.insert(BUCKET, "a/b/2.txt", now() - 40 * HOUR);

    let config = PruneConfig {
        dry_run: true,
        ..config("a/")
    };
    let mut reporter = RecordingReporter::default();
    let summary = Pruner::new(config)
        .run_at(&backend, &mut reporter, now())
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.removed, 2);
    assert_eq!(summary.removed_folders, 2);
    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.batches, 0);

    assert_eq!(backend.len(BUCKET), 2);
    assert!(backend.delete_calls().is_empty());
    assert!(!reporter.events.iter().any(|e| e.starts_with("batch")));
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_the_run() {
    let backend = MemoryBackend::new();
    for i in 0..2500 {
        backend.insert(BUCKET, format!("logs/{:05}.log", i), now() - 48 * HOUR);
    }
    backend.fail_delete_call(2);

    let mut reporter = RecordingReporter::default();
    let summary = Pruner::new(config("logs/"))
        .run_at(&backend, &mut reporter, now())
        .await
        .unwrap();

    assert_eq!(backend.delete_calls(), vec![1000, 1000, 500]);
    assert_eq!(summary.attempted, 2500);
    assert_eq!(summary.deleted, 1500);
    assert_eq!(summary.errored, 1000);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].batch, 2);
    assert_eq!(summary.failures[0].failed, 1000);
    assert!(summary.has_failures());

    let remaining = backend.keys(BUCKET);
    assert_eq!(remaining.len(), 1000);
    assert_eq!(remaining.first().map(String::as_str), Some("logs/01000.log"));
    assert_eq!(remaining.last().map(String::as_str), Some("logs/01999.log"));

    let batches: Vec<_> = reporter
        .events
        .iter()
        .filter(|e| e.starts_with("batch"))
        .collect();
    assert_eq!(batches, ["batch 1 1000/1000", "batch 2 0/1000", "batch 3 500/500"]);
}

#[tokio::test]
async fn test_rejected_keys_are_counted() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/locked.txt", now() - 30 * HOUR);
    backend.insert(BUCKET, "a/stale.txt", now() - 30 * HOUR);
    backend.reject_key("a/locked.txt");

    let summary = Pruner::new(config("a/"))
        .run_at(&backend, &mut NullReporter, now())
        .await
        .unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.errored, 1);
    assert!(summary.has_failures());
    assert_eq!(backend.keys(BUCKET), vec!["a/locked.txt"]);
}

#[tokio::test]
async fn test_listing_cap_truncates_run() {
    let backend = MemoryBackend::new();
    for i in 0..5 {
        backend.insert(BUCKET, format!("a/{}.txt", i), now() - 30 * HOUR);
    }

    let config = PruneConfig {
        max_files: 3,
        ..config("a/")
    };
    let mut reporter = RecordingReporter::default();
    let summary = Pruner::new(config)
        .run_at(&backend, &mut reporter, now())
        .await
        .unwrap();

    assert_eq!(summary.listed, 3);
    assert!(summary.truncated);
    assert_eq!(summary.deleted, 3);
    assert_eq!(backend.keys(BUCKET), vec!["a/3.txt", "a/4.txt"]);
    assert!(reporter.events.contains(&"truncated 3".to_string()));
}

#[tokio::test]
async fn test_listing_failure_deletes_nothing() {
    let backend = MemoryBackend::new();
    for i in 0..5 {
        backend.insert(BUCKET, format!("a/{}.txt", i), now() - 30 * HOUR);
    }
    backend.fail_list_call(1);

    let result = Pruner::new(config("a/"))
        .run_at(&backend, &mut NullReporter, now())
        .await;

    assert!(matches!(result, Err(PruneError::Backend { page: 1, .. })));
    assert!(backend.delete_calls().is_empty());
    assert_eq!(backend.len(BUCKET), 5);
}

#[tokio::test]
async fn test_invalid_config_makes_no_backend_calls() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/1.txt", now() - 30 * HOUR);

    let result = Pruner::new(config(""))
        .run_at(&backend, &mut NullReporter, now())
        .await;

    assert!(matches!(result, Err(PruneError::Config(_))));
    assert_eq!(backend.list_calls(), 0);
}

#[tokio::test]
async fn test_events_arrive_in_pipeline_order() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/old.txt", now() - 30 * HOUR);
    backend.insert(BUCKET, "a/new.txt", now() - HOUR);

    let config = PruneConfig {
        show_progress: true,
        ..config("a/")
    };
    let mut reporter = RecordingReporter::default();
    Pruner::new(config)
        .run_at(&backend, &mut reporter, now())
        .await
        .unwrap();

    assert_eq!(
        reporter.events,
        [
            "started",
            "page 1 2",
            "removal 1",
            "batch 1 1/1",
            "retention 1",
            "finished",
        ]
    );
}

#[tokio::test]
async fn test_runs_are_independent() {
    let backend = MemoryBackend::new();
    backend.insert(BUCKET, "a/1.txt", now() - 30 * HOUR);

    let pruner = Pruner::new(config("a/"));
    let first = pruner.run_at(&backend, &mut NullReporter, now()).await.unwrap();
    let second = pruner.run_at(&backend, &mut NullReporter, now()).await.unwrap();

    assert_eq!(first.deleted, 1);
    assert_eq!(second.listed, 0);
    assert_eq!(second.deleted, 0);
    assert_ne!(first.run_id, second.run_id);
}
