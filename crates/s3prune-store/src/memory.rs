//! In-memory backend

use crate::StoreError;
use async_trait::async_trait;
use s3prune_domain::{DeleteReport, ListedObject, ObjectPage, StorageBackend, MAX_DELETE_BATCH, MAX_PAGE_SIZE};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, SystemTime>>,
    list_calls: usize,
    delete_calls: Vec<usize>,
    fail_list_call: Option<usize>,
    fail_delete_call: Option<usize>,
    rejected_keys: BTreeSet<String>,
}

/// [`StorageBackend`] keeping objects in process memory
///
/// Listing follows S3 semantics: keys in byte order, continuation tokens are
/// the last key of the previous page. Individual list or delete calls can be
/// made to fail, and single keys can be made undeletable.
///
/// # Examples
///
/// ```
/// use s3prune_store::MemoryBackend;
/// use std::time::SystemTime;
///
/// let backend = MemoryBackend::new();
/// backend.insert("bucket", "logs/app.log", SystemTime::now());
/// assert_eq!(backend.len("bucket"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an object, replacing any previous one under the same key
    pub fn insert(&self, bucket: &str, key: impl Into<String>, last_modified: SystemTime) {
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.into(), last_modified);
    }

    /// Number of objects in `bucket`
    pub fn len(&self, bucket: &str) -> usize {
        self.state().buckets.get(bucket).map_or(0, BTreeMap::len)
    }

    /// Whether `bucket` holds no objects
    pub fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket) == 0
    }

    /// Whether `key` exists in `bucket`
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.state()
            .buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    /// All keys in `bucket`, in byte order
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of list calls served so far
    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// Sizes of the delete calls received so far, in order
    pub fn delete_calls(&self) -> Vec<usize> {
        self.state().delete_calls.clone()
    }

    /// Make the `call`-th list call (1-based) fail
    pub fn fail_list_call(&self, call: usize) {
        self.state().fail_list_call = Some(call);
    }

    /// Make the `call`-th delete call (1-based) fail as a whole
    pub fn fail_delete_call(&self, call: usize) {
        self.state().fail_delete_call = Some(call);
    }

    /// Make deletes of `key` fail with a per-key error
    pub fn reject_key(&self, key: impl Into<String>) {
        self.state().rejected_keys.insert(key.into());
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    type Error = StoreError;

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_size: usize,
        continuation: Option<String>,
    ) -> Result<ObjectPage, Self::Error> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.fail_list_call == Some(state.list_calls) {
            return Err(StoreError::List("injected list failure".to_string()));
        }

        let Some(objects) = state.buckets.get(bucket) else {
            return Err(StoreError::List(format!("NoSuchBucket: {}", bucket)));
        };

        let start = match continuation {
            Some(token) => Bound::Excluded(token),
            None => Bound::Included(prefix.to_string()),
        };
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);

        let mut matching = objects
            .range((start, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix));

        let page: Vec<ListedObject> = matching
            .by_ref()
            .take(limit)
            .map(|(key, modified)| ListedObject::new(key.clone(), *modified))
            .collect();

        let next_continuation = match (matching.next(), page.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ObjectPage {
            objects: page,
            next_continuation,
        })
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<DeleteReport, Self::Error> {
        if keys.len() > MAX_DELETE_BATCH {
            return Err(StoreError::BatchTooLarge(keys.len()));
        }

        let mut state = self.state();
        state.delete_calls.push(keys.len());
        if state.fail_delete_call == Some(state.delete_calls.len()) {
            return Err(StoreError::Delete("injected delete failure".to_string()));
        }

        let State {
            buckets,
            rejected_keys,
            ..
        } = &mut *state;
        let Some(objects) = buckets.get_mut(bucket) else {
            return Err(StoreError::Delete(format!("NoSuchBucket: {}", bucket)));
        };

        let mut report = DeleteReport::default();
        for key in keys {
            if rejected_keys.contains(key) {
                report.errors.insert(key.clone(), "AccessDenied: Access Denied".to_string());
            } else {
                // Deleting a missing key succeeds, as on S3
                objects.remove(key);
                report.deleted.insert(key.clone());
            }
        }

        Ok(report)
    }
}
