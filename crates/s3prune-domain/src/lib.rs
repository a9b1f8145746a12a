//! s3prune Domain Layer
//!
//! Value types and trait interfaces shared by every other s3prune crate.
//! Nothing in here performs I/O; storage providers implement
//! [`traits::StorageBackend`] in the infrastructure layer (s3prune-store).
//!
//! ## Key Concepts
//!
//! - **ObjectRecord**: One object under the prefix, with its folder/file split and age
//! - **Page**: One bounded chunk of listing results returned by a single backend call
//! - **Batch**: A bounded group of keys submitted together in a single delete call
//! - **Provider limits**: At most 1000 objects per page and per delete call

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod object;
pub mod traits;

// Re-exports for convenience
pub use object::{split_key, ListedObject, ObjectRecord};
pub use traits::{DeleteReport, ObjectPage, StorageBackend, MAX_DELETE_BATCH, MAX_PAGE_SIZE};
