//! Configuration for prune runs
//!
//! Defines the target prefix, retention threshold and result cap.

use crate::PruneError;
use s3prune_domain::MAX_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single prune run
///
/// # Examples
///
/// ```
/// use s3prune_core::PruneConfig;
/// use std::time::Duration;
///
/// let config = PruneConfig::new("my-bucket", "logs/");
/// assert_eq!(config.max_age, Duration::from_secs(24 * 3600));
/// assert_eq!(config.max_files, 10_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneConfig {
    /// Bucket to prune
    pub bucket: String,

    /// Only keys starting with this prefix are listed
    pub prefix: String,

    /// Objects older than this are removed (exclusive: equal age is kept)
    /// Default: 24 hours
    #[serde(with = "humantime_serde", default = "default_max_age")]
    pub max_age: Duration,

    /// Cap on the number of objects listed per run
    /// Default: 10000
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Dry-run mode: report what would be deleted without deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Emit a progress event per listing page
    /// Default: false
    #[serde(default)]
    pub show_progress: bool,
}

fn default_max_age() -> Duration {
    Duration::from_secs(24 * 3600)
}

fn default_max_files() -> usize {
    10_000
}

impl PruneConfig {
    /// Create a configuration with default thresholds for `bucket`/`prefix`
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            max_age: default_max_age(),
            max_files: default_max_files(),
            dry_run: false,
            show_progress: false,
        }
    }

    /// Check the run parameters before touching the backend
    pub fn validate(&self) -> Result<(), PruneError> {
        if self.bucket.is_empty() {
            return Err(PruneError::Config("bucket must not be empty".into()));
        }
        if self.prefix.is_empty() {
            return Err(PruneError::Config("prefix must not be empty".into()));
        }
        if self.max_files == 0 {
            return Err(PruneError::Config("max files must be greater than zero".into()));
        }
        Ok(())
    }

    /// Page size requested from the backend
    pub fn page_size(&self) -> usize {
        self.max_files.min(MAX_PAGE_SIZE)
    }
}
