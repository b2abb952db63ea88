use anyhow::Context;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::s3::{
    CreateBucketOutput, CreateBucketRequest, GetObjectOutput, ListBucketsFilter,
    ListBucketsOutput, ObjectReference, ObjectStore, S3Client, SignedUrlRequest, UploadOptions,
    UploadOutput, UploadRequest, DEFAULT_SIGNED_URL_EXPIRY,
};

/// Failure of [`StorageFacade::upload_stream`]
#[derive(Debug, thiserror::Error)]
pub enum StreamUploadError<E> {
    /// The payload stream failed before anything was sent
    #[error("Failed to read upload stream: {0}")]
    Read(#[source] std::io::Error),

    /// The provider's own error, unchanged
    #[error(transparent)]
    Provider(E),
}

/// Storage operations shared by the library API and the CLI
///
/// Every call builds its parameters and hands them to the provider once.
/// Provider errors are logged and returned unchanged: the facade never
/// retries, wraps or translates them. Cloning is as cheap as cloning the
/// provider.
#[derive(Debug, Clone)]
pub struct StorageFacade<P> {
    provider: P,
}

impl StorageFacade<S3Client> {
    /// Build a facade over the S3 REST client described by the active profile
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let profile = config.active_profile()?;
        let client = S3Client::from_profile(profile).context("Failed to build S3 client")?;
        Ok(Self::new(client))
    }
}

impl<P: ObjectStore> StorageFacade<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// List buckets. An empty filter lists everything the credentials can see.
    pub async fn list_buckets(&self, filter: ListBucketsFilter) -> Result<ListBucketsOutput, P::Error> {
        match self.provider.list_buckets(&filter).await {
            Ok(output) => {
                debug!(count = output.buckets.len(), "Listed buckets");
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, ?filter, "List buckets failed");
                Err(e)
            }
        }
    }

    /// Create a bucket, returning its location
    pub async fn create_bucket(
        &self,
        request: CreateBucketRequest,
    ) -> Result<CreateBucketOutput, P::Error> {
        match self.provider.create_bucket(&request).await {
            Ok(output) => {
                info!(bucket = %request.bucket, location = %output.location, "Bucket created");
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, bucket = %request.bucket, "Create bucket failed");
                Err(e)
            }
        }
    }

    /// Upload `file_data` to `bucket_name`/`file_name`, overwriting any existing object.
    ///
    /// Metadata in `options` is attached only when the map is non-empty.
    pub async fn upload(
        &self,
        file_data: impl Into<Bytes>,
        file_name: &str,
        bucket_name: &str,
        content_type: &str,
        options: UploadOptions,
    ) -> Result<UploadOutput, P::Error> {
        let request = UploadRequest::new(bucket_name, file_name, content_type, file_data.into())
            .with_metadata(options.metadata);

        match self.provider.put_object(request).await {
            Ok(output) => {
                info!("File {}, uploaded successfully at {}", file_name, bucket_name);
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, bucket = %bucket_name, key = %file_name, "Upload failed");
                Err(e)
            }
        }
    }

    /// Upload a byte stream. The stream is read to its end, then sent as one object.
    pub async fn upload_stream<R>(
        &self,
        mut file_data: R,
        file_name: &str,
        bucket_name: &str,
        content_type: &str,
        options: UploadOptions,
    ) -> Result<UploadOutput, StreamUploadError<P::Error>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buf = Vec::new();
        if let Err(e) = file_data.read_to_end(&mut buf).await {
            error!(error = %e, bucket = %bucket_name, key = %file_name, "Reading upload stream failed");
            return Err(StreamUploadError::Read(e));
        }

        self.upload(buf, file_name, bucket_name, content_type, options)
            .await
            .map_err(StreamUploadError::Provider)
    }

    /// Fetch the body and metadata of `bucket_name`/`file_name`
    pub async fn get_document(
        &self,
        file_name: &str,
        bucket_name: &str,
    ) -> Result<GetObjectOutput, P::Error> {
        let object = ObjectReference::new(bucket_name, file_name);

        match self.provider.get_object(&object).await {
            Ok(output) => {
                debug!(bucket = %bucket_name, key = %file_name, size = output.body.len(), "Fetched document");
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, bucket = %bucket_name, key = %file_name, "Get document failed");
                Err(e)
            }
        }
    }

    /// Time-limited GET URL for an object; no network access.
    ///
    /// `expiry` defaults to 60 seconds. With `file_name`, downloads through
    /// the URL are served as `Content-Disposition: attachment;filename=<file_name>`.
    pub fn get_signed_url(
        &self,
        bucket_name: &str,
        key: &str,
        file_name: Option<&str>,
        expiry: Option<u64>,
    ) -> Result<String, P::Error> {
        let request = SignedUrlRequest::new(bucket_name, key)
            .with_file_name(file_name.map(str::to_string))
            .with_expiry(expiry.unwrap_or(DEFAULT_SIGNED_URL_EXPIRY));

        self.provider.presign_get_object(&request).map_err(|e| {
            error!(error = %e, bucket = %bucket_name, key = %key, "Signing URL failed");
            e
        })
    }
}
