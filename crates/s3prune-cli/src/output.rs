//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use s3prune_core::{BatchReport, ObjectSet, PruneEvent, Reporter, RunSummary};
use std::time::{Duration, SystemTime};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the final run summary.
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_summary_json(summary),
            OutputFormat::Table => Ok(self.format_summary_table(summary)),
            OutputFormat::Text => Ok(self.format_summary_text(summary)),
        }
    }

    /// Format the summary as JSON.
    fn format_summary_json(&self, summary: &RunSummary) -> Result<String> {
        let failures: Vec<serde_json::Value> = summary
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "batch": f.batch,
                    "key_count": f.key_count,
                    "failed": f.failed,
                    "message": f.message,
                })
            })
            .collect();

        let json = serde_json::json!({
            "run_id": summary.run_id.to_string(),
            "bucket": summary.bucket,
            "prefix": summary.prefix,
            "dry_run": summary.dry_run,
            "listed": summary.listed,
            "truncated": summary.truncated,
            "removed": {
                "objects": summary.removed,
                "folders": summary.removed_folders,
            },
            "kept": {
                "objects": summary.kept,
                "folders": summary.kept_folders,
            },
            "attempted": summary.attempted,
            "deleted": summary.deleted,
            "errored": summary.errored,
            "batches": summary.batches,
            "failures": failures,
            "elapsed_secs": summary.elapsed.as_secs_f64(),
        });

        Ok(serde_json::to_string_pretty(&json)?)
    }

    /// Format the summary as a table.
    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        builder.push_record(["Target".to_string(), format!("s3://{}/{}", summary.bucket, summary.prefix)]);
        builder.push_record(["Listed".to_string(), summary.listed.to_string()]);
        builder.push_record(["Truncated".to_string(), summary.truncated.to_string()]);
        builder.push_record([
            if summary.dry_run { "Would remove" } else { "Removed" }.to_string(),
            format!("{} ({} folders)", summary.removed, summary.removed_folders),
        ]);
        builder.push_record([
            "Kept".to_string(),
            format!("{} ({} folders)", summary.kept, summary.kept_folders),
        ]);
        if !summary.dry_run {
            builder.push_record(["Deleted".to_string(), summary.deleted.to_string()]);
            builder.push_record(["Errors".to_string(), summary.errored.to_string()]);
            builder.push_record(["Batches".to_string(), summary.batches.to_string()]);
        }
        builder.push_record(["Elapsed".to_string(), format!("{:.2}s", summary.elapsed.as_secs_f64())]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the summary as a single completion line.
    fn format_summary_text(&self, summary: &RunSummary) -> String {
        let line = format!("completed in {:.3} seconds", summary.elapsed.as_secs_f64());
        if summary.has_failures() {
            self.warning(&format!("{} ({} deletion error(s))", line, summary.errored))
        } else {
            self.success(&line)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Which parts of an object set listing to print.
#[derive(Debug, Clone, Copy)]
pub struct ListingOptions {
    /// Print one line per file
    pub files: bool,
    /// Print a header line per folder
    pub folders: bool,
}

/// Reporter that prints prune events to stdout.
///
/// In JSON mode nothing is printed while the run is in progress; the summary
/// is printed once at the end by the caller.
pub struct ConsoleReporter {
    formatter: Formatter,
    region: String,
    listing: ListingOptions,
}

impl ConsoleReporter {
    /// Create a console reporter.
    pub fn new(formatter: Formatter, region: impl Into<String>, listing: ListingOptions) -> Self {
        Self {
            formatter,
            region: region.into(),
            listing,
        }
    }

    /// Render an event into output lines.
    pub fn render(&self, event: &PruneEvent<'_>) -> Vec<String> {
        if self.formatter.format() == OutputFormat::Json {
            return Vec::new();
        }

        match event {
            PruneEvent::Started {
                bucket,
                prefix,
                max_age,
                max_results,
                dry_run,
            } => vec![self.formatter.info(&format!(
                "searching s3 (bucket={} region={} prefix={} max-age={} max-files={} dry-run={})",
                bucket,
                self.region,
                prefix,
                humantime::format_duration(*max_age),
                max_results,
                dry_run
            ))],
            PruneEvent::PageFetched { page, fetched } => {
                vec![format!("  page {}: {} objects fetched", page, fetched)]
            }
            PruneEvent::Truncated { max_results } => vec![self.formatter.warning(&format!(
                "results were truncated due to max-files limit of {}",
                max_results
            ))],
            PruneEvent::Removal(set) => {
                let header = if set.dry_run {
                    format!(
                        "would remove {} s3 objects from {} folders",
                        set.records.len(),
                        set.folder_count
                    )
                } else {
                    format!(
                        "removing {} s3 objects from {} folders in batches of {}",
                        set.records.len(),
                        set.folder_count,
                        set.batch_size
                    )
                };
                self.with_listing(header, set)
            }
            PruneEvent::BatchCompleted(report) => vec![self.render_batch(report)],
            PruneEvent::Retention(set) => {
                let verb = if set.dry_run { "would keep" } else { "keeping" };
                let header = format!(
                    "{} {} s3 objects in {} folders",
                    verb,
                    set.records.len(),
                    set.folder_count
                );
                self.with_listing(header, set)
            }
            PruneEvent::Finished(summary) => match self.formatter.format() {
                OutputFormat::Text => summary
                    .failures
                    .iter()
                    .map(|f| {
                        self.formatter.error(&format!(
                            "batch {} ({} keys): {}",
                            f.batch, f.key_count, f.message
                        ))
                    })
                    .collect(),
                _ => Vec::new(),
            },
        }
    }

    fn render_batch(&self, report: &BatchReport) -> String {
        match &report.transport_error {
            Some(e) => self.formatter.error(&format!(
                "batch {}: failed to delete {} s3 objects: {}",
                report.index, report.attempted, e
            )),
            None => format!(
                "batch {}: successfully deleted {} s3 objects, {} error(s)",
                report.index, report.deleted, report.errors
            ),
        }
    }

    fn with_listing(&self, header: String, set: &ObjectSet<'_>) -> Vec<String> {
        let mut lines = vec![header];
        for group in set.groups() {
            if self.listing.folders {
                let folder = if group.folder.is_empty() { "." } else { group.folder };
                lines.push(format!("  {}", folder));
            }
            if self.listing.files {
                for entry in &group.entries {
                    lines.push(format!(
                        "    {} (modified={} age={}h)",
                        entry.file,
                        format_timestamp(entry.last_modified),
                        age_hours(entry.age)
                    ));
                }
            }
        }
        lines
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: PruneEvent<'_>) {
        for line in self.render(&event) {
            println!("{}", line);
        }
    }
}

/// RFC 3339 timestamp with second precision.
fn format_timestamp(time: SystemTime) -> String {
    humantime::format_rfc3339_seconds(time).to_string()
}

/// Age rounded to whole hours.
fn age_hours(age: Duration) -> u64 {
    (age.as_secs_f64() / 3600.0).round() as u64
}
