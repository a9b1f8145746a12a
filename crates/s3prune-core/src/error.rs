//! Error types for prune operations

use thiserror::Error;

/// Errors that abort a prune run
///
/// Failed delete batches are not errors at this level; they are counted in
/// [`crate::BatchOutcome`] and the run carries on.
#[derive(Error, Debug)]
pub enum PruneError {
    /// Invalid run parameters, detected before any backend call
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend failed while listing; nothing has been deleted
    #[error("Backend error while listing page {page}: {message}")]
    Backend {
        /// 1-based index of the page that failed
        page: usize,
        /// Provider error message
        message: String,
    },
}
