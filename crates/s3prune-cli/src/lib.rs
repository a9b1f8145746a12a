//! s3prune CLI library.
//!
//! Argument parsing, profile management, console reporting and the command
//! implementations behind the `s3prune` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
