//! Age-based partitioning of listed objects

use s3prune_domain::ObjectRecord;
use std::time::{Duration, SystemTime};

/// Disjoint remove/keep partition, both in ascending key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Records strictly older than the threshold
    pub remove: Vec<ObjectRecord>,

    /// Everything else
    pub keep: Vec<ObjectRecord>,
}

/// Sort records ascending by key, byte-wise
pub fn sort_by_key(records: &mut [ObjectRecord]) {
    records.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Sort, decompose and partition `records` by age
///
/// `now` is the run's single reference instant. A record is removed only if
/// its age is strictly greater than `max_age`.
pub fn classify(mut records: Vec<ObjectRecord>, now: SystemTime, max_age: Duration) -> Classification {
    sort_by_key(&mut records);

    let mut classification = Classification::default();
    for mut record in records {
        record.decompose(now);
        if record.age > max_age {
            classification.remove.push(record);
        } else {
            classification.keep.push(record);
        }
    }

    tracing::debug!(
        remove = classification.remove.len(),
        keep = classification.keep.len(),
        "Classified objects"
    );

    classification
}
