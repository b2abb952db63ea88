//! Provider seam between the facade and an object storage backend

use async_trait::async_trait;

use crate::s3::types::{
    CreateBucketOutput, CreateBucketRequest, GetObjectOutput, ListBucketsFilter,
    ListBucketsOutput, ObjectReference, SignedUrlRequest, UploadOutput, UploadRequest,
};

/// Generic object storage provider
///
/// Each method maps to exactly one provider call. Implementations report
/// failures through their own `Error` type, which callers receive untouched.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists buckets visible to the configured credentials
    async fn list_buckets(
        &self,
        filter: &ListBucketsFilter,
    ) -> Result<ListBucketsOutput, Self::Error>;

    /// Creates a bucket
    async fn create_bucket(
        &self,
        request: &CreateBucketRequest,
    ) -> Result<CreateBucketOutput, Self::Error>;

    /// Creates or overwrites an object
    async fn put_object(&self, request: UploadRequest) -> Result<UploadOutput, Self::Error>;

    /// Retrieves the content and metadata of a stored object
    async fn get_object(&self, object: &ObjectReference) -> Result<GetObjectOutput, Self::Error>;

    /// Produces a time-limited GET link without touching the network
    fn presign_get_object(&self, request: &SignedUrlRequest) -> Result<String, Self::Error>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    type Error = T::Error;

    async fn list_buckets(
        &self,
        filter: &ListBucketsFilter,
    ) -> Result<ListBucketsOutput, Self::Error> {
        (**self).list_buckets(filter).await
    }

    async fn create_bucket(
        &self,
        request: &CreateBucketRequest,
    ) -> Result<CreateBucketOutput, Self::Error> {
        (**self).create_bucket(request).await
    }

    async fn put_object(&self, request: UploadRequest) -> Result<UploadOutput, Self::Error> {
        (**self).put_object(request).await
    }

    async fn get_object(&self, object: &ObjectReference) -> Result<GetObjectOutput, Self::Error> {
        (**self).get_object(object).await
    }

    fn presign_get_object(&self, request: &SignedUrlRequest) -> Result<String, Self::Error> {
        (**self).presign_get_object(request)
    }
}
