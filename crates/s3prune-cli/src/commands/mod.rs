//! Command implementations.

pub mod profile;
pub mod prune;

pub use self::profile::execute_profile;
pub use self::prune::{execute_prune, PruneTarget};
