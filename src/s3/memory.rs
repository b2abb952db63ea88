//! In-process `ObjectStore` used as a provider double
//!
//! Buckets and objects live in a `RwLock`-guarded map. Errors mirror the S3
//! error codes a real service would answer with, and presigned URLs are
//! produced by the same SigV4 signer the network client uses.

use crate::config::Profile;
use crate::s3::signer::{S3SignerV4, MAX_PRESIGN_EXPIRY_SECS};
use crate::s3::store::ObjectStore;
use crate::s3::types::{
    Bucket, CreateBucketOutput, CreateBucketRequest, GetObjectOutput, ListBucketsFilter,
    ListBucketsOutput, ObjectReference, Owner, SignedUrlRequest, UploadOutput, UploadRequest,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Failures reported by the in-memory store, named after their S3 codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("NoSuchBucket: {0}")]
    NoSuchBucket(String),

    #[error("NoSuchKey: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },

    #[error("BucketAlreadyOwnedByYou: {0}")]
    BucketAlreadyOwnedByYou(String),

    #[error("InvalidRequest: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    etag: String,
    last_modified: String,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    creation_date: String,
    objects: BTreeMap<String, StoredObject>,
}

/// Object storage held entirely in memory
#[derive(Debug)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, MemoryBucket>>,
    signer: S3SignerV4,
    endpoint: String,
    owner: Owner,
}

impl MemoryStore {
    /// Store that signs URLs with the profile's credentials and endpoint
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
            signer: S3SignerV4::new(
                profile.access_key.clone(),
                profile.secret_key.clone(),
                Some(profile.region.clone()),
            ),
            endpoint: profile.endpoint_url(),
            owner: Owner {
                id: Some(profile.access_key.clone()),
                display_name: None,
            },
        }
    }

    /// Number of objects currently stored in `bucket`
    pub fn object_count(&self, bucket: &str) -> usize {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets.get(bucket).map_or(0, |b| b.objects.len())
    }

    fn require(field: &str, value: &str) -> Result<(), MemoryError> {
        if value.is_empty() {
            return Err(MemoryError::InvalidRequest(format!(
                "{} must not be empty",
                field
            )));
        }
        Ok(())
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            bucket,
            S3SignerV4::uri_encode(key, false)
        )
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_profile(&Profile::new("memory", "memory").with_endpoint("http://localhost:9000"))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    type Error = MemoryError;

    async fn list_buckets(
        &self,
        filter: &ListBucketsFilter,
    ) -> Result<ListBucketsOutput, MemoryError> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        let prefix = filter.prefix.as_deref().unwrap_or("");
        let after = filter.continuation_token.as_deref().unwrap_or("");
        let limit = filter
            .max_buckets
            .and_then(|m| usize::try_from(m).ok())
            .unwrap_or(usize::MAX);

        let mut matching = buckets
            .iter()
            .filter(|(name, _)| name.starts_with(prefix) && name.as_str() > after)
            .map(|(name, bucket)| Bucket {
                name: name.clone(),
                creation_date: Some(bucket.creation_date.clone()),
                bucket_region: Some(self.signer.region().to_string()),
            });

        let page: Vec<Bucket> = matching.by_ref().take(limit).collect();
        let continuation_token = match (matching.next(), page.last()) {
            (Some(_), Some(last)) => Some(last.name.clone()),
            _ => None,
        };

        Ok(ListBucketsOutput {
            buckets: page,
            owner: Some(self.owner.clone()),
            continuation_token,
            prefix: filter.prefix.clone(),
        })
    }

    async fn create_bucket(
        &self,
        request: &CreateBucketRequest,
    ) -> Result<CreateBucketOutput, MemoryError> {
        Self::require("bucket", &request.bucket)?;

        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        if buckets.contains_key(&request.bucket) {
            return Err(MemoryError::BucketAlreadyOwnedByYou(request.bucket.clone()));
        }
        buckets.insert(
            request.bucket.clone(),
            MemoryBucket {
                creation_date: Self::now(),
                objects: BTreeMap::new(),
            },
        );

        Ok(CreateBucketOutput {
            location: format!("/{}", request.bucket),
        })
    }

    async fn put_object(&self, request: UploadRequest) -> Result<UploadOutput, MemoryError> {
        Self::require("bucket", &request.bucket)?;
        Self::require("key", &request.key)?;

        let location = self.object_url(&request.bucket, &request.key);
        let etag = format!("\"{:x}\"", md5::compute(&request.body));

        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets
            .get_mut(&request.bucket)
            .ok_or_else(|| MemoryError::NoSuchBucket(request.bucket.clone()))?;

        bucket.objects.insert(
            request.key.clone(),
            StoredObject {
                body: request.body,
                content_type: request.content_type,
                etag: etag.clone(),
                last_modified: Self::now(),
                metadata: request.metadata.unwrap_or_default(),
            },
        );

        Ok(UploadOutput {
            etag: Some(etag),
            location,
            key: request.key,
            bucket: request.bucket,
        })
    }

    async fn get_object(&self, object: &ObjectReference) -> Result<GetObjectOutput, MemoryError> {
        Self::require("bucket", &object.bucket)?;
        Self::require("key", &object.key)?;

        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets
            .get(&object.bucket)
            .ok_or_else(|| MemoryError::NoSuchBucket(object.bucket.clone()))?;
        let stored = bucket
            .objects
            .get(&object.key)
            .ok_or_else(|| MemoryError::NoSuchKey {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
            })?;

        Ok(GetObjectOutput {
            body: stored.body.clone(),
            content_type: Some(stored.content_type.clone()),
            content_length: Some(stored.body.len() as u64),
            etag: Some(stored.etag.clone()),
            last_modified: Some(stored.last_modified.clone()),
            metadata: stored.metadata.clone(),
        })
    }

    fn presign_get_object(&self, request: &SignedUrlRequest) -> Result<String, MemoryError> {
        Self::require("bucket", &request.bucket)?;
        Self::require("key", &request.key)?;
        if request.expiry_secs == 0 || request.expiry_secs > MAX_PRESIGN_EXPIRY_SECS {
            return Err(MemoryError::InvalidRequest(format!(
                "expiry must be between 1 and {} seconds",
                MAX_PRESIGN_EXPIRY_SECS
            )));
        }

        let url = self.object_url(&request.bucket, &request.key);
        let disposition = request.content_disposition();
        let extra: Vec<(&str, &str)> = disposition
            .as_deref()
            .map(|d| vec![("response-content-disposition", d)])
            .unwrap_or_default();

        Ok(self
            .signer
            .presign("GET", &url, request.expiry_secs, &extra, Utc::now()))
    }
}
