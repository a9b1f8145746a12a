//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Region used when neither a flag nor the profile names one.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// s3prune - Delete S3 objects older than a retention threshold.
#[derive(Debug, Parser)]
#[command(name = "s3prune")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "S3PRUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Line-oriented output (default)
    Text,
    /// Summary table
    Table,
    /// JSON summary
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove objects older than the maximum age
    Prune(PruneArgs),

    /// Manage saved prune targets
    Profile(ProfileArgs),
}

/// Arguments for the prune command.
#[derive(Debug, Clone, Parser)]
pub struct PruneArgs {
    /// Bucket name
    #[arg(short, long, env = "S3PRUNE_BUCKET")]
    pub bucket: Option<String>,

    /// AWS region [default: eu-central-1]
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Key prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Maximum object age, e.g. "24h", "90min", "7days" [default: 24h]
    #[arg(long, value_parser = humantime::parse_duration)]
    pub max_age: Option<Duration>,

    /// Maximum number of objects to process [default: 10000]
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Report what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Show per-page listing progress
    #[arg(long)]
    pub progress: bool,

    /// List every file
    #[arg(long)]
    pub list_files: bool,

    /// List folder headers
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub list_folders: bool,

    /// Custom S3 endpoint URL (MinIO, R2, ...)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub force_path_style: bool,
}

impl Default for PruneArgs {
    /// Same values clap produces when no flag is given.
    fn default() -> Self {
        Self {
            bucket: None,
            region: None,
            prefix: None,
            max_age: None,
            max_files: None,
            dry_run: false,
            progress: false,
            list_files: false,
            list_folders: true,
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Bucket name
        #[arg(short, long)]
        bucket: String,
        /// Key prefix
        #[arg(long)]
        prefix: String,
        /// AWS region
        #[arg(short, long)]
        region: Option<String>,
        /// Maximum object age
        #[arg(long, value_parser = humantime::parse_duration)]
        max_age: Option<Duration>,
        /// Maximum number of objects to process
        #[arg(long)]
        max_files: Option<usize>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => crate::config::OutputFormat::Text,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_command_defaults() {
        let cli = Cli::parse_from(["s3prune", "prune", "--bucket", "logs", "--prefix", "app/"]);
        match cli.command {
            Command::Prune(args) => {
                assert_eq!(args.bucket.as_deref(), Some("logs"));
                assert_eq!(args.prefix.as_deref(), Some("app/"));
                assert!(args.max_age.is_none());
                assert!(!args.dry_run);
                assert!(!args.list_files);
                assert!(args.list_folders);
            }
            _ => panic!("Expected Prune command"),
        }
    }

    #[test]
    fn test_prune_command_flags() {
        let cli = Cli::parse_from([
            "s3prune",
            "-vv",
            "--format",
            "json",
            "prune",
            "--bucket",
            "logs",
            "--prefix",
            "app/",
            "--max-age",
            "36h",
            "--max-files",
            "500",
            "--dry-run",
            "--list-folders",
            "false",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Prune(args) => {
                assert_eq!(args.max_age, Some(Duration::from_secs(36 * 3600)));
                assert_eq!(args.max_files, Some(500));
                assert!(args.dry_run);
                assert!(!args.list_folders);
            }
            _ => panic!("Expected Prune command"),
        }
    }

    #[test]
    fn test_prune_args_default_matches_parser() {
        let parsed = PruneArgs::parse_from(["prune"]);
        let default = PruneArgs::default();

        assert_eq!(default.list_folders, parsed.list_folders);
        assert_eq!(default.list_files, parsed.list_files);
        assert_eq!(default.dry_run, parsed.dry_run);
        assert_eq!(default.max_age, parsed.max_age);
        assert_eq!(default.max_files, parsed.max_files);
        assert!(default.list_folders);
    }

    #[test]
    fn test_invalid_max_age_rejected() {
        let result = Cli::try_parse_from(["s3prune", "prune", "--max-age", "yesterday"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_set_command() {
        let cli = Cli::parse_from([
            "s3prune", "profile", "set", "nightly", "--bucket", "ci", "--prefix", "nightly/",
        ]);
        match cli.command {
            Command::Profile(ProfileArgs {
                action: ProfileAction::Set { name, bucket, .. },
            }) => {
                assert_eq!(name, "nightly");
                assert_eq!(bucket, "ci");
            }
            _ => panic!("Expected Profile Set command"),
        }
    }
}
