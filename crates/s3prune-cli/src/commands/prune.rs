//! Prune command implementation.

use crate::cli::{PruneArgs, DEFAULT_REGION};
use crate::config::Profile;
use crate::error::{CliError, Result};
use crate::output::{ConsoleReporter, Formatter, ListingOptions};
use s3prune_core::{PruneConfig, Pruner, RunSummary};
use s3prune_store::{S3Backend, S3Config};

/// Effective run parameters after merging flags and profile.
#[derive(Debug, Clone)]
pub struct PruneTarget {
    /// Pipeline configuration
    pub prune: PruneConfig,
    /// S3 connection settings
    pub s3: S3Config,
}

impl PruneTarget {
    /// Merge command-line flags over profile values over defaults.
    ///
    /// Fails if bucket, region or prefix end up empty, before any backend
    /// call is made.
    pub fn resolve(args: &PruneArgs, profile: Option<&Profile>) -> Result<Self> {
        let from_profile = |f: fn(&Profile) -> Option<String>| profile.and_then(f);

        let bucket = args
            .bucket
            .clone()
            .or_else(|| from_profile(|p| p.bucket.clone()))
            .unwrap_or_default();
        let region = args
            .region
            .clone()
            .or_else(|| from_profile(|p| p.region.clone()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let prefix = args
            .prefix
            .clone()
            .or_else(|| from_profile(|p| p.prefix.clone()))
            .unwrap_or_default();

        let mut missing = Vec::new();
        if bucket.is_empty() {
            missing.push("--bucket");
        }
        if region.is_empty() {
            missing.push("--region");
        }
        if prefix.is_empty() {
            missing.push("--prefix");
        }
        if !missing.is_empty() {
            return Err(CliError::Config(format!(
                "missing required option(s): {}",
                missing.join(", ")
            )));
        }

        let defaults = PruneConfig::new(bucket, prefix);
        let prune = PruneConfig {
            max_age: args
                .max_age
                .or_else(|| profile.and_then(|p| p.max_age))
                .unwrap_or(defaults.max_age),
            max_files: args
                .max_files
                .or_else(|| profile.and_then(|p| p.max_files))
                .unwrap_or(defaults.max_files),
            dry_run: args.dry_run,
            show_progress: args.progress,
            ..defaults
        };
        prune.validate()?;

        let s3 = S3Config {
            region,
            endpoint: args
                .endpoint_url
                .clone()
                .or_else(|| from_profile(|p| p.endpoint_url.clone())),
            force_path_style: args.force_path_style || profile.is_some_and(|p| p.force_path_style),
        };

        Ok(Self { prune, s3 })
    }
}

/// Execute the prune command.
///
/// Ctrl+C drops the in-flight run: no further batches are sent and objects
/// already deleted stay deleted.
pub async fn execute_prune(
    args: PruneArgs,
    profile: Option<&Profile>,
    formatter: &Formatter,
) -> Result<RunSummary> {
    let target = PruneTarget::resolve(&args, profile)?;

    let backend = S3Backend::new(&target.s3).await;
    let mut reporter = ConsoleReporter::new(
        formatter.clone(),
        target.s3.region.clone(),
        ListingOptions {
            files: args.list_files,
            folders: args.list_folders,
        },
    );
    let pruner = Pruner::new(target.prune);

    tokio::select! {
        result = pruner.run(&backend, &mut reporter) => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received, abandoning prune run");
            Err(CliError::Cancelled)
        }
    }
}
