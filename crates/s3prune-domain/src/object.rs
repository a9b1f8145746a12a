//! Object module - a single storage object under the pruned prefix

use std::time::{Duration, SystemTime};

/// An object as returned by a listing page, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    /// Full object key
    pub key: String,

    /// Timestamp of the last write
    pub last_modified: SystemTime,
}

impl ListedObject {
    /// Create a listed object
    pub fn new(key: impl Into<String>, last_modified: SystemTime) -> Self {
        Self {
            key: key.into(),
            last_modified,
        }
    }
}

/// One storage object under the prefix
///
/// Built by the lister with only `bucket`, `key` and `last_modified` set.
/// Classification fills in `folder`, `file` and `age`; after that the record
/// is never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Container the object lives in
    pub bucket: String,

    /// Full object key, unique within the bucket
    pub key: String,

    /// Key without its final path segment ("" for top-level keys)
    pub folder: String,

    /// Final path segment of the key
    pub file: String,

    /// Timestamp of the last write
    pub last_modified: SystemTime,

    /// Time elapsed between the run's reference instant and `last_modified`
    pub age: Duration,
}

impl ObjectRecord {
    /// Create an unclassified record from listing data
    pub fn new(bucket: impl Into<String>, listed: ListedObject) -> Self {
        Self {
            bucket: bucket.into(),
            key: listed.key,
            folder: String::new(),
            file: String::new(),
            last_modified: listed.last_modified,
            age: Duration::ZERO,
        }
    }

    /// Populate `folder`, `file` and `age` relative to `now`
    ///
    /// Objects stamped after `now` (clock skew) get an age of zero.
    pub fn decompose(&mut self, now: SystemTime) {
        let (folder, file) = split_key(&self.key);
        self.folder = folder.to_string();
        self.file = file.to_string();
        self.age = now
            .duration_since(self.last_modified)
            .unwrap_or(Duration::ZERO);
    }
}

/// Split a key into `(folder, file)` at the last `/`
///
/// A key without `/` is a top-level file: `("", key)`.
pub fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(idx) => (&key[..idx], &key[idx + 1..]),
        None => ("", key),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: folder and file always reassemble into the input key
        #[test]
        fn test_split_reassembles(key in "[a-z/]{0,24}") {
            let (folder, file) = split_key(&key);
            if key.contains('/') {
                prop_assert_eq!(format!("{}/{}", folder, file), key);
            } else {
                prop_assert_eq!(folder, "");
                prop_assert_eq!(file, key.as_str());
            }
        }

        /// Property: the file segment never contains a separator
        #[test]
        fn test_file_has_no_separator(key in "[a-z0-9/._-]{0,32}") {
            let (_, file) = split_key(&key);
            prop_assert!(!file.contains('/'));
        }
    }
}
