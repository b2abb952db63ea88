//! S3 client implementation of the `ObjectStore` provider
//!
//! - HTTP/1.1 only, hyper-util pooled client
//! - TCP_NODELAY, 90s keepalive, 10s connect timeout
//! - native-tls (OpenSSL) for TLS
//! - Zero-copy Bytes for get/put bodies
//! - UNSIGNED-PAYLOAD for PUT (skips SHA256 of body)
//! - One request per call: failures are returned as-is, never retried

use crate::config::Profile;
use crate::s3::signer::{S3SignerV4, MAX_PRESIGN_EXPIRY_SECS};
use crate::s3::store::ObjectStore;
use crate::s3::types::{
    Bucket, CreateBucketOutput, CreateBucketRequest, GetObjectOutput, ListBucketsFilter,
    ListBucketsOutput, ObjectReference, Owner, SignedUrlRequest, UploadOutput, UploadRequest,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::{Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Hex lookup table for URI encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

const METADATA_PREFIX: &str = "x-amz-meta-";

/// S3 client errors
#[derive(Error, Debug)]
pub enum S3Error {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("Hyper error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("S3 error: {status} - {}: {message}", .code.as_deref().unwrap_or("Unknown"))]
    S3Response {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<quick_xml::Error> for S3Error {
    fn from(err: quick_xml::Error) -> Self {
        S3Error::XmlParse(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for S3Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        S3Error::InvalidResponse(format!("Client error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, S3Error>;

/// S3 REST client
///
/// Clone is cheap - the underlying HTTP client uses Arc internally.
#[derive(Clone)]
pub struct S3Client {
    /// Hyper HTTP client with pooled connections
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    /// AWS SigV4 signer (with signing key cache)
    signer: S3SignerV4,
    /// Service endpoint without trailing slash
    endpoint: String,
    /// Sent in the user-agent header
    api_version: String,
    /// Request timeout
    timeout: Duration,
}

impl S3Client {
    /// Create a new S3 client
    pub fn new(
        access_key: String,
        secret_key: String,
        endpoint: String,
        region: Option<String>,
    ) -> Result<Self> {
        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(10)));
        http.set_keepalive(Some(Duration::from_secs(90)));

        let tls = TlsConnector::new()?;
        let https = HttpsConnector::from((http, tls.into()));

        let client = HyperClient::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .set_host(true)
            .build(https);

        let signer = S3SignerV4::new(access_key, secret_key, region);

        Ok(Self {
            client,
            signer,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: crate::config::S3_API_VERSION.to_string(),
            timeout: Duration::from_secs(300),
        })
    }

    /// Build a client from a configuration profile
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        let client = Self::new(
            profile.access_key.clone(),
            profile.secret_key.clone(),
            profile.endpoint_url(),
            Some(profile.region.clone()),
        )?
        .with_timeout(profile.timeout());

        tracing::debug!(
            endpoint = %client.endpoint,
            region = %profile.region,
            api_version = %profile.api_version,
            "S3 client initialized"
        );

        Ok(Self {
            api_version: profile.api_version.clone(),
            ..client
        })
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sign and send one request, returning status, headers and the full body.
    ///
    /// Non-2xx statuses become `S3Error::S3Response`.
    async fn send(
        &self,
        method: Method,
        url: &str,
        signed_headers: BTreeMap<String, String>,
        body: Bytes,
    ) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let mut req = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(
                "user-agent",
                format!(
                    "s3facade/{} (s3-api {})",
                    env!("CARGO_PKG_VERSION"),
                    self.api_version
                ),
            );
        for (key, value) in signed_headers.iter() {
            req = req.header(key, value);
        }
        let request = req.body(Full::new(body))?;

        let exchange = async {
            let response = self.client.request(request).await?;
            let (parts, body) = response.into_parts();
            let body_bytes = body.collect().await?.to_bytes();
            Ok::<_, S3Error>((parts.status, parts.headers, body_bytes))
        };

        let (status, headers, body_bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| S3Error::Timeout(self.timeout))??;

        tracing::debug!(%method, %url, status = status.as_u16(), "S3 request completed");

        if !status.is_success() {
            return Err(Self::error_from_response(status, &body_bytes));
        }

        Ok((status, headers, body_bytes))
    }

    /// Turn an S3 `<Error>` document into `S3Error::S3Response`
    fn error_from_response(status: StatusCode, body: &[u8]) -> S3Error {
        let (code, message) = Self::parse_error_body(body);
        let message = message.unwrap_or_else(|| String::from_utf8_lossy(body).to_string());
        S3Error::S3Response {
            status,
            code,
            message,
        }
    }

    fn parse_error_body(body: &[u8]) -> (Option<String>, Option<String>) {
        let mut reader = Reader::from_reader(body);
        reader.config_mut().trim_text_start = true;
        reader.config_mut().trim_text_end = true;

        let mut code = None;
        let mut message = None;
        let mut current_text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Text(e)) => {
                    current_text.clear();
                    if let Ok(text) = e.unescape() {
                        current_text.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => {
                    match e.local_name().as_ref() {
                        b"Code" => code = Some(std::mem::take(&mut current_text)),
                        b"Message" => message = Some(std::mem::take(&mut current_text)),
                        _ => {}
                    }
                    current_text.clear();
                }
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
        }

        (code, message)
    }

    fn require(field: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(S3Error::InvalidRequest(format!("{} must not be empty", field)));
        }
        Ok(())
    }

    /// Encode an S3 key, preserving forward slashes
    /// Returns Cow::Borrowed when no encoding is needed
    fn encode_s3_key(key: &str) -> Cow<'_, str> {
        let needs_encoding = key
            .bytes()
            .any(|b| !matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/'));

        if !needs_encoding {
            return Cow::Borrowed(key);
        }

        let mut result = String::with_capacity(key.len() + 32);
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                    result.push(byte as char);
                }
                _ => {
                    result.push('%');
                    result.push(HEX_UPPER[(byte >> 4) as usize] as char);
                    result.push(HEX_UPPER[(byte & 0xf) as usize] as char);
                }
            }
        }
        Cow::Owned(result)
    }

    /// Path-style object URL: `{endpoint}/{bucket}/{key}`
    fn build_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = Self::encode_s3_key(key);
        let mut url =
            String::with_capacity(self.endpoint.len() + 1 + bucket.len() + 1 + encoded_key.len());
        url.push_str(&self.endpoint);
        url.push('/');
        url.push_str(bucket);
        url.push('/');
        url.push_str(&encoded_key);
        url
    }

    fn build_bucket_url(&self, bucket: &str) -> String {
        format!("{}/{}", self.endpoint, bucket)
    }

    /// Service-root URL with ListBuckets query parameters, in sorted order
    fn build_list_buckets_url(&self, filter: &ListBucketsFilter) -> String {
        let mut url = format!("{}/", self.endpoint);
        let params = filter.query_params();
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, S3SignerV4::uri_encode(v, true)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Collect `x-amz-meta-*` response headers, prefix stripped
    fn metadata_from_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().strip_prefix(METADATA_PREFIX)?;
                let value = value.to_str().ok()?;
                Some((key.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Headers for a PutObject request, metadata included
    fn put_headers(request: &UploadRequest) -> Result<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), request.content_type.clone());
        headers.insert("content-length".to_string(), request.body.len().to_string());

        let md5_hash = md5::compute(&request.body);
        headers.insert(
            "content-md5".to_string(),
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &md5_hash[..]),
        );

        if let Some(metadata) = &request.metadata {
            for (key, value) in metadata {
                let name = format!("{}{}", METADATA_PREFIX, key.to_ascii_lowercase());
                // S3 stores metadata keys lowercased
                if headers.insert(name, value.clone()).is_some() {
                    return Err(S3Error::InvalidRequest(format!(
                        "metadata key {:?} collides with another key differing only in case",
                        key
                    )));
                }
            }
        }
        Ok(headers)
    }

    /// CreateBucketConfiguration document, when a location is requested
    fn create_bucket_body(location: Option<&str>) -> Bytes {
        match location {
            Some(location) => {
                let mut xml = String::with_capacity(160);
                xml.push_str("<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">");
                xml.push_str("<LocationConstraint>");
                Self::xml_escape_into(&mut xml, location);
                xml.push_str("</LocationConstraint></CreateBucketConfiguration>");
                Bytes::from(xml)
            }
            None => Bytes::new(),
        }
    }

    fn xml_escape_into(buf: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '&' => buf.push_str("&amp;"),
                '<' => buf.push_str("&lt;"),
                '>' => buf.push_str("&gt;"),
                '"' => buf.push_str("&quot;"),
                '\'' => buf.push_str("&apos;"),
                _ => buf.push(c),
            }
        }
    }

    /// Parse ListAllMyBucketsResult XML
    fn parse_list_buckets_response(xml_data: &[u8]) -> Result<ListBucketsOutput> {
        let mut reader = Reader::from_reader(xml_data);
        reader.config_mut().trim_text_start = true;
        reader.config_mut().trim_text_end = true;

        let mut response = ListBucketsOutput::default();
        let mut current_bucket: Option<Bucket> = None;
        let mut current_owner: Option<Owner> = None;
        let mut current_text = String::with_capacity(128);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"Bucket" => current_bucket = Some(Bucket::new(String::new())),
                    b"Owner" => current_owner = Some(Owner::default()),
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    current_text.clear();
                    current_text.push_str(&e.unescape()?);
                }
                Ok(Event::End(e)) => {
                    match e.local_name().as_ref() {
                        b"Name" => {
                            if let Some(ref mut bucket) = current_bucket {
                                bucket.name = std::mem::take(&mut current_text);
                            }
                        }
                        b"CreationDate" => {
                            if let Some(ref mut bucket) = current_bucket {
                                bucket.creation_date = Some(std::mem::take(&mut current_text));
                            }
                        }
                        b"BucketRegion" => {
                            if let Some(ref mut bucket) = current_bucket {
                                bucket.bucket_region = Some(std::mem::take(&mut current_text));
                            }
                        }
                        b"Bucket" => {
                            if let Some(bucket) = current_bucket.take() {
                                response.buckets.push(bucket);
                            }
                        }
                        b"ID" => {
                            if let Some(ref mut owner) = current_owner {
                                owner.id = Some(std::mem::take(&mut current_text));
                            }
                        }
                        b"DisplayName" => {
                            if let Some(ref mut owner) = current_owner {
                                owner.display_name = Some(std::mem::take(&mut current_text));
                            }
                        }
                        b"Owner" => {
                            response.owner = current_owner.take();
                        }
                        b"ContinuationToken" => {
                            response.continuation_token = Some(std::mem::take(&mut current_text));
                        }
                        b"Prefix" => {
                            response.prefix = Some(std::mem::take(&mut current_text));
                        }
                        _ => {}
                    }

                    current_text.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(S3Error::XmlParse(format!("XML parse error: {}", e)));
                }
                _ => {}
            }
        }

        Ok(response)
    }

    /// Presigned GET URL, signed at the given instant
    pub fn presign_at(&self, request: &SignedUrlRequest, now: DateTime<Utc>) -> Result<String> {
        Self::require("bucket", &request.bucket)?;
        Self::require("key", &request.key)?;
        if request.expiry_secs == 0 || request.expiry_secs > MAX_PRESIGN_EXPIRY_SECS {
            return Err(S3Error::InvalidRequest(format!(
                "expiry must be between 1 and {} seconds, got {}",
                MAX_PRESIGN_EXPIRY_SECS, request.expiry_secs
            )));
        }

        let url = self.build_url(&request.bucket, &request.key);
        let disposition = request.content_disposition();
        let extra: Vec<(&str, &str)> = disposition
            .as_deref()
            .map(|d| vec![("response-content-disposition", d)])
            .unwrap_or_default();

        Ok(self
            .signer
            .presign("GET", &url, request.expiry_secs, &extra, now))
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    type Error = S3Error;

    async fn list_buckets(&self, filter: &ListBucketsFilter) -> Result<ListBucketsOutput> {
        let url = self.build_list_buckets_url(filter);
        let headers = self.signer.sign("GET", &url, BTreeMap::new(), b"");

        let (_, _, body) = self.send(Method::GET, &url, headers, Bytes::new()).await?;

        Self::parse_list_buckets_response(&body)
    }

    async fn create_bucket(&self, request: &CreateBucketRequest) -> Result<CreateBucketOutput> {
        Self::require("bucket", &request.bucket)?;

        // Outside us-east-1 the service requires an explicit location
        let location = request.location_constraint.as_deref().or_else(|| {
            let region = self.signer.region();
            (region != "us-east-1").then_some(region)
        });

        let url = self.build_bucket_url(&request.bucket);
        let body = Self::create_bucket_body(location);

        let mut headers = request.headers();
        if !body.is_empty() {
            headers.insert("content-type".to_string(), "application/xml".to_string());
            headers.insert("content-length".to_string(), body.len().to_string());
        }
        let headers = self.signer.sign("PUT", &url, headers, &body);

        let (_, resp_headers, _) = self.send(Method::PUT, &url, headers, body).await?;

        let location = Self::header_string(&resp_headers, "location")
            .unwrap_or_else(|| format!("/{}", request.bucket));
        Ok(CreateBucketOutput { location })
    }

    async fn put_object(&self, request: UploadRequest) -> Result<UploadOutput> {
        Self::require("bucket", &request.bucket)?;
        Self::require("key", &request.key)?;

        let url = self.build_url(&request.bucket, &request.key);
        let headers = self
            .signer
            .sign_unsigned_payload("PUT", &url, Self::put_headers(&request)?);

        let (_, resp_headers, _) = self
            .send(Method::PUT, &url, headers, request.body.clone())
            .await?;

        Ok(UploadOutput {
            etag: Self::header_string(&resp_headers, "etag"),
            location: url,
            key: request.key,
            bucket: request.bucket,
        })
    }

    async fn get_object(&self, object: &ObjectReference) -> Result<GetObjectOutput> {
        Self::require("bucket", &object.bucket)?;
        Self::require("key", &object.key)?;

        let url = self.build_url(&object.bucket, &object.key);
        let headers = self.signer.sign("GET", &url, BTreeMap::new(), b"");

        let (_, resp_headers, body) = self.send(Method::GET, &url, headers, Bytes::new()).await?;

        Ok(GetObjectOutput {
            content_type: Self::header_string(&resp_headers, "content-type"),
            content_length: Self::header_string(&resp_headers, "content-length")
                .and_then(|v| v.parse().ok()),
            etag: Self::header_string(&resp_headers, "etag"),
            last_modified: Self::header_string(&resp_headers, "last-modified"),
            metadata: Self::metadata_from_headers(&resp_headers),
            body,
        })
    }

    fn presign_get_object(&self, request: &SignedUrlRequest) -> Result<String> {
        self.presign_at(request, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> S3Client {
        S3Client::new(
            "access_key".to_string(),
            "secret_key".to_string(),
            "https://s3.ap-south-1.amazonaws.com/".to_string(),
            Some("ap-south-1".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.endpoint(), "https://s3.ap-south-1.amazonaws.com");
        let _clone = client.clone();
    }

    #[test]
    fn test_encode_s3_key_no_encoding() {
        let result = S3Client::encode_s3_key("path/to/file.txt");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "path/to/file.txt");
    }

    #[test]
    fn test_encode_s3_key_with_encoding() {
        let result = S3Client::encode_s3_key("path/to/file with spaces.txt");
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "path/to/file%20with%20spaces.txt");
    }

    #[test]
    fn test_build_urls() {
        let client = client();
        assert_eq!(
            client.build_url("file-uploads", "s3.png"),
            "https://s3.ap-south-1.amazonaws.com/file-uploads/s3.png"
        );
        assert_eq!(
            client.build_list_buckets_url(&ListBucketsFilter::default()),
            "https://s3.ap-south-1.amazonaws.com/"
        );

        let filter = ListBucketsFilter {
            prefix: Some("my logs".to_string()),
            max_buckets: Some(5),
            ..Default::default()
        };
        assert_eq!(
            client.build_list_buckets_url(&filter),
            "https://s3.ap-south-1.amazonaws.com/?max-buckets=5&prefix=my%20logs"
        );
    }

    #[test]
    fn test_put_headers_metadata() {
        let mut meta = BTreeMap::new();
        meta.insert("Owner".to_string(), "ops".to_string());
        let request = UploadRequest::new("b", "k", "image/png", Bytes::from_static(b"hi"))
            .with_metadata(Some(meta));

        let headers = S3Client::put_headers(&request).unwrap();
        assert_eq!(headers["content-type"], "image/png");
        assert_eq!(headers["content-length"], "2");
        assert_eq!(headers["x-amz-meta-owner"], "ops");
        // base64(md5("hi"))
        assert_eq!(headers["content-md5"], "SfaKXIST7CwL9ImCHCH8Ow==");

        let bare = UploadRequest::new("b", "k", "image/png", Bytes::from_static(b"hi"));
        assert!(!S3Client::put_headers(&bare)
            .unwrap()
            .keys()
            .any(|k| k.starts_with(METADATA_PREFIX)));
    }

    #[test]
    fn test_put_headers_rejects_case_colliding_metadata() {
        let mut meta = BTreeMap::new();
        meta.insert("Owner".to_string(), "alice".to_string());
        meta.insert("owner".to_string(), "bob".to_string());
        let request = UploadRequest::new("b", "k", "text/plain", Bytes::from_static(b"hi"))
            .with_metadata(Some(meta));

        assert!(matches!(
            S3Client::put_headers(&request),
            Err(S3Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_list_buckets_response() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc123</ID><DisplayName>owner</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>file-uploads</Name><CreationDate>2021-01-01T00:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>archive</Name><CreationDate>2022-06-01T00:00:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

        let result = S3Client::parse_list_buckets_response(xml).unwrap();
        let names: Vec<_> = result.buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["file-uploads", "archive"]);
        assert_eq!(
            result.buckets[0].creation_date.as_deref(),
            Some("2021-01-01T00:00:00.000Z")
        );
        let owner = result.owner.unwrap();
        assert_eq!(owner.id.as_deref(), Some("abc123"));
        assert_eq!(owner.display_name.as_deref(), Some("owner"));
        assert!(result.continuation_token.is_none());
    }

    #[test]
    fn test_error_from_response() {
        let body = b"<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>";
        match S3Client::error_from_response(StatusCode::NOT_FOUND, body) {
            S3Error::S3Response { status, code, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(code.as_deref(), Some("NoSuchKey"));
                assert_eq!(message, "The specified key does not exist.");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match S3Client::error_from_response(StatusCode::FORBIDDEN, b"denied") {
            S3Error::S3Response { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_create_bucket_body() {
        assert!(S3Client::create_bucket_body(None).is_empty());
        let body = S3Client::create_bucket_body(Some("ap-south-1"));
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("<LocationConstraint>ap-south-1</LocationConstraint>"));
    }

    #[test]
    fn test_presign_rejects_bad_input() {
        let client = client();
        let now = Utc::now();
        assert!(matches!(
            client.presign_at(&SignedUrlRequest::new("", "k"), now),
            Err(S3Error::InvalidRequest(_))
        ));
        assert!(matches!(
            client.presign_at(&SignedUrlRequest::new("b", "k").with_expiry(0), now),
            Err(S3Error::InvalidRequest(_))
        ));
        assert!(matches!(
            client.presign_at(&SignedUrlRequest::new("b", "k").with_expiry(604_801), now),
            Err(S3Error::InvalidRequest(_))
        ));
    }
}
