//! s3prune - delete S3 objects older than a retention threshold.

use clap::Parser;
use s3prune_cli::commands;
use s3prune_cli::{logging, Cli, Command, Config, Formatter};

/// Exit code when the run completed but some deletions failed.
const EXIT_PARTIAL_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run() -> s3prune_cli::Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Prune(args) => {
            let profile = config.resolve_profile(cli.profile.as_deref())?;
            let summary = commands::execute_prune(args, profile, &formatter).await?;
            println!("{}", formatter.format_summary(&summary)?);
            if summary.has_failures() {
                return Ok(EXIT_PARTIAL_FAILURE);
            }
        }
        Command::Profile(args) => {
            commands::execute_profile(args, &mut config, &config_path, &formatter)?;
        }
    }

    Ok(0)
}
