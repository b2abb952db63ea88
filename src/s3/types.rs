//! S3 request and response structures

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default lifetime of a presigned URL in seconds
pub const DEFAULT_SIGNED_URL_EXPIRY: u64 = 60;

// =============================================================================
// ListBuckets
// =============================================================================

/// Optional ListBuckets parameters, forwarded verbatim as query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketsFilter {
    pub prefix: Option<String>,
    pub max_buckets: Option<i32>,
    pub continuation_token: Option<String>,
    pub bucket_region: Option<String>,
}

impl ListBucketsFilter {
    /// Query parameters in the order the request URL carries them
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(region) = &self.bucket_region {
            params.push(("bucket-region", region.clone()));
        }
        if let Some(token) = &self.continuation_token {
            params.push(("continuation-token", token.clone()));
        }
        if let Some(max) = self.max_buckets {
            params.push(("max-buckets", max.to_string()));
        }
        if let Some(prefix) = &self.prefix {
            params.push(("prefix", prefix.clone()));
        }
        params
    }
}

/// Bucket descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    /// ISO-8601 creation timestamp as reported by the service
    pub creation_date: Option<String>,
    pub bucket_region: Option<String>,
}

impl Bucket {
    pub fn new(name: String) -> Self {
        Self {
            name,
            creation_date: None,
            bucket_region: None,
        }
    }
}

/// Bucket owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// Response from ListBuckets, in service order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketsOutput {
    pub buckets: Vec<Bucket>,
    pub owner: Option<Owner>,
    pub continuation_token: Option<String>,
    pub prefix: Option<String>,
}

// =============================================================================
// CreateBucket
// =============================================================================

/// Canned ACL applied on bucket creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl BucketAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketAcl::Private => "private",
            BucketAcl::PublicRead => "public-read",
            BucketAcl::PublicReadWrite => "public-read-write",
            BucketAcl::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl std::str::FromStr for BucketAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(BucketAcl::Private),
            "public-read" => Ok(BucketAcl::PublicRead),
            "public-read-write" => Ok(BucketAcl::PublicReadWrite),
            "authenticated-read" => Ok(BucketAcl::AuthenticatedRead),
            other => Err(format!("unknown canned ACL: {}", other)),
        }
    }
}

/// Object ownership setting for a new bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectOwnership {
    BucketOwnerPreferred,
    ObjectWriter,
    BucketOwnerEnforced,
}

impl ObjectOwnership {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectOwnership::BucketOwnerPreferred => "BucketOwnerPreferred",
            ObjectOwnership::ObjectWriter => "ObjectWriter",
            ObjectOwnership::BucketOwnerEnforced => "BucketOwnerEnforced",
        }
    }
}

/// CreateBucket parameters. Everything except the name is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketRequest {
    pub bucket: String,
    pub acl: Option<BucketAcl>,
    /// Region constraint written into the CreateBucketConfiguration body
    pub location_constraint: Option<String>,
    pub object_lock_enabled: Option<bool>,
    pub object_ownership: Option<ObjectOwnership>,
    pub grant_full_control: Option<String>,
    pub grant_read: Option<String>,
    pub grant_read_acp: Option<String>,
    pub grant_write: Option<String>,
    pub grant_write_acp: Option<String>,
}

impl CreateBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn with_acl(mut self, acl: BucketAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_location_constraint(mut self, location: impl Into<String>) -> Self {
        self.location_constraint = Some(location.into());
        self
    }

    pub fn with_object_lock(mut self, enabled: bool) -> Self {
        self.object_lock_enabled = Some(enabled);
        self
    }

    pub fn with_object_ownership(mut self, ownership: ObjectOwnership) -> Self {
        self.object_ownership = Some(ownership);
        self
    }

    /// `x-amz-*` request headers carrying the optional settings
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let Some(acl) = self.acl {
            headers.insert("x-amz-acl".to_string(), acl.as_str().to_string());
        }
        if let Some(enabled) = self.object_lock_enabled {
            headers.insert(
                "x-amz-bucket-object-lock-enabled".to_string(),
                enabled.to_string(),
            );
        }
        if let Some(ownership) = self.object_ownership {
            headers.insert(
                "x-amz-object-ownership".to_string(),
                ownership.as_str().to_string(),
            );
        }
        let grants = [
            ("x-amz-grant-full-control", &self.grant_full_control),
            ("x-amz-grant-read", &self.grant_read),
            ("x-amz-grant-read-acp", &self.grant_read_acp),
            ("x-amz-grant-write", &self.grant_write),
            ("x-amz-grant-write-acp", &self.grant_write_acp),
        ];
        for (name, value) in grants {
            if let Some(value) = value {
                headers.insert(name.to_string(), value.clone());
            }
        }
        headers
    }
}

/// Response from CreateBucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketOutput {
    /// e.g. `/file-uploads` or `http://file-uploads.s3.amazonaws.com/`
    pub location: String,
}

// =============================================================================
// PutObject
// =============================================================================

/// Options accepted by `upload`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub metadata: Option<BTreeMap<String, String>>,
}

impl UploadOptions {
    pub fn with_metadata(metadata: BTreeMap<String, String>) -> Self {
        Self {
            metadata: Some(metadata),
        }
    }
}

/// A single object write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
    /// User metadata, only set when non-empty
    pub metadata: Option<BTreeMap<String, String>>,
}

impl UploadRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        content_type: impl Into<String>,
        body: Bytes,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content_type: content_type.into(),
            body,
            metadata: None,
        }
    }

    /// Attach metadata; an empty map leaves the request without a metadata field
    pub fn with_metadata(mut self, metadata: Option<BTreeMap<String, String>>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_empty());
        self
    }
}

/// Response from PutObject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutput {
    /// Quoted content checksum as returned by the service
    pub etag: Option<String>,
    pub location: String,
    pub key: String,
    pub bucket: String,
}

// =============================================================================
// GetObject
// =============================================================================

/// Address of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

impl ObjectReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Object body plus the metadata the service returned with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObjectOutput {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

// =============================================================================
// Presigned GET
// =============================================================================

/// Parameters for a presigned GET URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest {
    pub bucket: String,
    pub key: String,
    /// Filename forced through `Content-Disposition: attachment`
    pub file_name: Option<String>,
    pub expiry_secs: u64,
}

impl SignedUrlRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            file_name: None,
            expiry_secs: DEFAULT_SIGNED_URL_EXPIRY,
        }
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    pub fn with_expiry(mut self, expiry_secs: u64) -> Self {
        self.expiry_secs = expiry_secs;
        self
    }

    /// Value for the `response-content-disposition` override, if any
    pub fn content_disposition(&self) -> Option<String> {
        self.file_name
            .as_ref()
            .map(|name| format!("attachment;filename={}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metadata_is_dropped() {
        let req = UploadRequest::new("b", "k", "text/plain", Bytes::from_static(b"x"))
            .with_metadata(Some(BTreeMap::new()));
        assert_eq!(req.metadata, None);
    }

    #[test]
    fn test_metadata_attached_verbatim() {
        let mut meta = BTreeMap::new();
        meta.insert("Owner".to_string(), "Alice Smith".to_string());
        let req = UploadRequest::new("b", "k", "text/plain", Bytes::new())
            .with_metadata(Some(meta.clone()));
        assert_eq!(req.metadata, Some(meta));
    }

    #[test]
    fn test_create_bucket_headers() {
        let req = CreateBucketRequest::new("file-uploads")
            .with_acl(BucketAcl::PublicRead)
            .with_object_lock(true)
            .with_object_ownership(ObjectOwnership::BucketOwnerEnforced);
        let headers = req.headers();

        assert_eq!(headers["x-amz-acl"], "public-read");
        assert_eq!(headers["x-amz-bucket-object-lock-enabled"], "true");
        assert_eq!(headers["x-amz-object-ownership"], "BucketOwnerEnforced");
        assert!(!headers.contains_key("x-amz-grant-read"));
        assert!(CreateBucketRequest::new("plain").headers().is_empty());
    }

    #[test]
    fn test_list_filter_params() {
        assert!(ListBucketsFilter::default().query_params().is_empty());

        let filter = ListBucketsFilter {
            prefix: Some("logs".to_string()),
            max_buckets: Some(10),
            ..Default::default()
        };
        assert_eq!(
            filter.query_params(),
            vec![("max-buckets", "10".to_string()), ("prefix", "logs".to_string())]
        );
    }

    #[test]
    fn test_content_disposition() {
        let req = SignedUrlRequest::new("b", "k");
        assert_eq!(req.expiry_secs, 60);
        assert_eq!(req.content_disposition(), None);

        let req = req.with_file_name(Some("report.pdf".to_string()));
        assert_eq!(
            req.content_disposition().as_deref(),
            Some("attachment;filename=report.pdf")
        );
    }

    #[test]
    fn test_acl_from_str() {
        assert_eq!("private".parse::<BucketAcl>(), Ok(BucketAcl::Private));
        assert!("everyone".parse::<BucketAcl>().is_err());
    }
}
