//! AWS S3 backend

use crate::StoreError;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use s3prune_domain::{DeleteReport, ListedObject, ObjectPage, StorageBackend, MAX_DELETE_BATCH, MAX_PAGE_SIZE};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Connection settings for [`S3Backend`]
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region
    pub region: String,

    /// Custom endpoint for S3-compatible services (MinIO, R2, ...)
    pub endpoint: Option<String>,

    /// Use path-style addressing (required by most S3-compatible services)
    pub force_path_style: bool,
}

impl S3Config {
    /// Settings for plain AWS S3 in `region`
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

/// [`StorageBackend`] over the AWS S3 API
///
/// Credentials come from the default AWS provider chain (environment,
/// profile, instance metadata).
pub struct S3Backend {
    client: aws_sdk_s3::Client,
}

impl S3Backend {
    /// Load credentials and build a client for `config`
    pub async fn new(config: &S3Config) -> Self {
        info!(region = %config.region, "Initializing S3 backend");

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Self::from_client(aws_sdk_s3::Client::from_conf(s3_config_builder.build()))
    }

    /// Wrap an already configured client
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    type Error = StoreError;

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_size: usize,
        continuation: Option<String>,
    ) -> Result<ObjectPage, Self::Error> {
        // Bounded by MAX_PAGE_SIZE, always fits
        let max_keys = i32::try_from(page_size.min(MAX_PAGE_SIZE)).unwrap_or(1000);

        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| StoreError::List(DisplayErrorContext(&e).to_string()))?;

        let mut objects = Vec::with_capacity(output.contents().len());
        for object in output.contents() {
            let (Some(key), Some(modified)) = (object.key(), object.last_modified()) else {
                warn!(bucket, "Skipping listed object without key or timestamp");
                continue;
            };
            match SystemTime::try_from(*modified) {
                Ok(last_modified) => objects.push(ListedObject::new(key, last_modified)),
                Err(e) => warn!(bucket, key, "Skipping object with unrepresentable timestamp: {}", e),
            }
        }

        let next_continuation = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        debug!(bucket, prefix, objects = objects.len(), more = next_continuation.is_some(), "Listed S3 page");

        Ok(ObjectPage {
            objects,
            next_continuation,
        })
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<DeleteReport, Self::Error> {
        if keys.len() > MAX_DELETE_BATCH {
            return Err(StoreError::BatchTooLarge(keys.len()));
        }

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StoreError::Delete(DisplayErrorContext(&e).to_string()))?;

        let mut report = DeleteReport::default();
        for deleted in output.deleted() {
            if let Some(key) = deleted.key() {
                report.deleted.insert(key.to_string());
            }
        }
        for error in output.errors() {
            if let Some(key) = error.key() {
                let message = format!(
                    "{}: {}",
                    error.code().unwrap_or("Unknown"),
                    error.message().unwrap_or("no message")
                );
                report.errors.insert(key.to_string(), message);
            }
        }

        Ok(report)
    }
}
