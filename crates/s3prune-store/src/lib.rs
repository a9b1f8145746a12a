//! s3prune Storage Layer
//!
//! Implements the [`StorageBackend`](s3prune_domain::StorageBackend) trait
//! for real and in-memory object stores.
//!
//! - [`S3Backend`]: AWS S3 and S3-compatible services via the AWS SDK
//! - [`MemoryBackend`]: in-process store with failure injection, for tests
//!   and local experiments
//!
//! # Examples
//!
//! ```no_run
//! use s3prune_store::{S3Backend, S3Config};
//!
//! # async fn demo() {
//! let backend = S3Backend::new(&S3Config::new("eu-central-1")).await;
//! # }
//! ```

#![warn(missing_docs)]

mod memory;
mod s3;

pub use memory::MemoryBackend;
pub use s3::{S3Backend, S3Config};

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Listing request failed
    #[error("List error: {0}")]
    List(String),

    /// Delete request failed as a whole
    #[error("Delete error: {0}")]
    Delete(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// More keys than a single delete call may carry
    #[error("Batch of {0} keys exceeds the provider limit")]
    BatchTooLarge(usize),
}
