//! Reporter surface
//!
//! The pipeline never renders anything itself. It hands structured events to
//! a [`Reporter`] and leaves formatting (text, JSON, progress lines) to the
//! caller.

use crate::{BatchReport, RunSummary};
use s3prune_domain::ObjectRecord;
use std::time::{Duration, SystemTime};

/// Sink for structured prune events
pub trait Reporter: Send {
    /// Receive one event
    fn report(&mut self, event: PruneEvent<'_>);
}

/// Reporter that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: PruneEvent<'_>) {}
}

/// Structured facts emitted during a run, in order of occurrence
#[derive(Debug)]
pub enum PruneEvent<'a> {
    /// The run is about to list the prefix
    Started {
        /// Bucket being pruned
        bucket: &'a str,
        /// Key prefix filter
        prefix: &'a str,
        /// Retention threshold
        max_age: Duration,
        /// Listing cap
        max_results: usize,
        /// Whether deletion is simulated
        dry_run: bool,
    },

    /// A listing page was consumed (only when progress is enabled)
    PageFetched {
        /// 1-based page index
        page: usize,
        /// Objects accumulated so far
        fetched: usize,
    },

    /// The listing cap was hit before the backend ran out of objects
    Truncated {
        /// The cap that was reached
        max_results: usize,
    },

    /// Objects selected for removal, before any deletion happens
    Removal(ObjectSet<'a>),

    /// One delete batch finished (successfully or not)
    BatchCompleted(&'a BatchReport),

    /// Objects that are kept
    Retention(ObjectSet<'a>),

    /// Final aggregates for the run
    Finished(&'a RunSummary),
}

/// An ordered, classified record sequence with its folder count
#[derive(Debug, Clone, Copy)]
pub struct ObjectSet<'a> {
    /// Records in ascending key order
    pub records: &'a [ObjectRecord],
    /// Number of distinct consecutive folders in `records`
    pub folder_count: usize,
    /// Whether the run is a dry run
    pub dry_run: bool,
    /// Keys per delete call
    pub batch_size: usize,
}

impl<'a> ObjectSet<'a> {
    /// Build a set view over key-sorted records
    pub fn new(records: &'a [ObjectRecord], dry_run: bool, batch_size: usize) -> Self {
        Self {
            records,
            folder_count: count_folders(records),
            dry_run,
            batch_size,
        }
    }

    /// Records grouped under their folder headers
    pub fn groups(&self) -> Vec<FolderGroup<'a>> {
        group_by_folder(self.records)
    }
}

/// One row of the folder/file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingEntry<'a> {
    /// Folder part of the key
    pub folder: &'a str,
    /// File part of the key
    pub file: &'a str,
    /// Last write timestamp
    pub last_modified: SystemTime,
    /// Age at the run's reference instant
    pub age: Duration,
}

impl<'a> From<&'a ObjectRecord> for ListingEntry<'a> {
    fn from(record: &'a ObjectRecord) -> Self {
        Self {
            folder: &record.folder,
            file: &record.file,
            last_modified: record.last_modified,
            age: record.age,
        }
    }
}

/// A run of consecutive records sharing one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderGroup<'a> {
    /// Shared folder ("" for top-level keys)
    pub folder: &'a str,
    /// Files in key order
    pub entries: Vec<ListingEntry<'a>>,
}

/// Count distinct consecutive `folder` values
///
/// Relies on key order: after a lexicographic sort every folder's keys are
/// adjacent, so counting transitions counts folders. Top-level keys count as
/// one folder of their own.
pub fn count_folders(records: &[ObjectRecord]) -> usize {
    let mut count = 0;
    let mut current: Option<&str> = None;
    for record in records {
        if current != Some(record.folder.as_str()) {
            current = Some(record.folder.as_str());
            count += 1;
        }
    }
    count
}

/// Group key-sorted records by consecutive folder
pub fn group_by_folder(records: &[ObjectRecord]) -> Vec<FolderGroup<'_>> {
    let mut groups: Vec<FolderGroup<'_>> = Vec::new();
    for record in records {
        match groups.last_mut() {
            Some(group) if group.folder == record.folder => group.entries.push(record.into()),
            _ => groups.push(FolderGroup {
                folder: &record.folder,
                entries: vec![record.into()],
            }),
        }
    }
    groups
}
