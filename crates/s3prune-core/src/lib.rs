//! s3prune Core
//!
//! Enumerates objects under a key prefix, classifies them by age and deletes
//! the ones past the retention threshold.
//!
//! # Overview
//!
//! A run is a strictly sequential pipeline:
//! - **Listing** ([`ObjectLister`]): paginates the prefix up to a hard cap and
//!   reports whether the cap cut the listing short
//! - **Classification** ([`classify`]): sorts by key, splits keys into
//!   folder/file and partitions records into remove/keep by age
//! - **Deletion** ([`BatchDeleter`]): deletes the remove set in batches of at
//!   most 1000 keys; a failed batch never stops the rest
//!
//! Every stage emits structured [`PruneEvent`]s to a [`Reporter`]; rendering
//! is left to the caller.
//!
//! # Usage
//!
//! ```no_run
//! use s3prune_core::{NullReporter, PruneConfig, Pruner};
//! use s3prune_store::MemoryBackend;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MemoryBackend::new();
//! let config = PruneConfig {
//!     max_age: Duration::from_secs(7 * 86400),
//!     dry_run: true,
//!     ..PruneConfig::new("my-bucket", "backups/")
//! };
//!
//! let summary = Pruner::new(config).run(&backend, &mut NullReporter).await?;
//! println!("would remove {} objects", summary.removed);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`PruneConfig`] deserializes from TOML or JSON:
//!
//! ```toml
//! bucket = "my-bucket"
//! prefix = "backups/"
//! max_age = "7days"
//! max_files = 10000
//! dry_run = true
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod deleter;
mod error;
mod lister;
mod pruner;
mod report;
mod summary;

pub use classifier::{classify, sort_by_key, Classification};
pub use config::PruneConfig;
pub use deleter::{split_batches, BatchDeleter, BatchFailure, BatchOutcome, BatchReport};
pub use error::PruneError;
pub use lister::{ListingResult, ObjectLister};
pub use pruner::Pruner;
pub use report::{
    count_folders, group_by_folder, FolderGroup, ListingEntry, NullReporter, ObjectSet, PruneEvent,
    Reporter,
};
pub use summary::RunSummary;
