//! AWS Signature Version 4 signer for S3 requests
//!
//! Two signing modes:
//! - Header signing (`sign`, `sign_unsigned_payload`) for requests sent by the client
//! - Query-string presigning (`presign`) for URLs handed to third parties
//!
//! Optimized with:
//! - Pre-computed AWS4+secret_key bytes
//! - Daily signing key cache (avoids 4 HMAC operations per request)
//! - Constant empty payload hash (avoids SHA256 for empty bodies)
//! - Zero-allocation URI encoding (hex lookup table, no format!())

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Mutex;

type HmacSha256 = Hmac<Sha256>;

/// Hex lookup table for zero-allocation percent encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Pre-computed SHA256 hash of empty payload
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Longest lifetime SigV4 accepts for a presigned URL (7 days)
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 604_800;

/// AWS Signature Version 4 signer
pub struct S3SignerV4 {
    access_key: String,
    region: String,
    service: String,
    /// "AWS4" + secret_key as bytes
    aws4_key: Vec<u8>,
    /// Cached signing key per day: (date_stamp, derived_key)
    cached_signing_key: Mutex<Option<(String, [u8; 32])>>,
}

impl Clone for S3SignerV4 {
    fn clone(&self) -> Self {
        Self {
            access_key: self.access_key.clone(),
            region: self.region.clone(),
            service: self.service.clone(),
            aws4_key: self.aws4_key.clone(),
            // Each clone gets its own cache (populated on first use)
            cached_signing_key: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for S3SignerV4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3SignerV4")
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl S3SignerV4 {
    /// Create a new S3 signer
    pub fn new(access_key: String, secret_key: String, region: Option<String>) -> Self {
        let region = region.unwrap_or_else(|| "us-east-1".to_string());
        let aws4_key = format!("AWS4{}", secret_key).into_bytes();
        Self {
            access_key,
            region,
            service: "s3".to_string(),
            aws4_key,
            cached_signing_key: Mutex::new(None),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign an S3 request with AWS Signature V4, hashing the payload
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: BTreeMap<String, String>,
        payload: &[u8],
    ) -> BTreeMap<String, String> {
        self.sign_at(method, url, headers, payload, Utc::now())
    }

    /// Same as `sign`, with an explicit signing time
    pub fn sign_at(
        &self,
        method: &str,
        url: &str,
        headers: BTreeMap<String, String>,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        if payload.is_empty() {
            self.sign_with_hash(method, url, headers, EMPTY_SHA256, now)
        } else {
            let hash = hex::encode(Sha256::digest(payload));
            self.sign_with_hash(method, url, headers, &hash, now)
        }
    }

    /// Sign with UNSIGNED-PAYLOAD (for PUT bodies, avoids SHA256 of body)
    pub fn sign_unsigned_payload(
        &self,
        method: &str,
        url: &str,
        headers: BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        self.sign_with_hash(method, url, headers, UNSIGNED_PAYLOAD, Utc::now())
    }

    fn sign_with_hash(
        &self,
        method: &str,
        url: &str,
        mut headers: BTreeMap<String, String>,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        let (host, path, query) = Self::parse_url_fast(url);

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();

        // Required headers (lowercase for canonical form)
        headers.insert("host".to_string(), host.to_string());
        headers.insert("x-amz-date".to_string(), amz_date.clone());
        headers.insert(
            "x-amz-content-sha256".to_string(),
            payload_hash.to_string(),
        );

        let canonical_query = Self::create_canonical_query_string(query);
        let canonical_headers = Self::create_canonical_headers(&headers);
        let signed_headers = Self::create_signed_headers(&headers);

        // Path is already URI-encoded by the URL builders
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, path, canonical_query, canonical_headers, signed_headers, payload_hash
        );
        tracing::trace!(%method, %url, %canonical_request, "SigV4 canonical request");

        let credential_scope = self.credential_scope(&date_stamp);
        let string_to_sign = Self::string_to_sign(&amz_date, &credential_scope, &canonical_request);
        let signature = self.calculate_signature(&date_stamp, &string_to_sign);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key, credential_scope, signed_headers, signature
        );
        headers.insert("authorization".to_string(), authorization);

        headers
    }

    /// Build a presigned URL (SigV4 query-string authentication)
    ///
    /// Only the `host` header is signed and the payload is `UNSIGNED-PAYLOAD`,
    /// so the URL works for any client that can issue a plain request.
    /// `extra_query` parameters (e.g. `response-content-disposition`) are
    /// covered by the signature. No network access happens here.
    pub fn presign(
        &self,
        method: &str,
        url: &str,
        expires_secs: u64,
        extra_query: &[(&str, &str)],
        now: DateTime<Utc>,
    ) -> String {
        let base = url.split('?').next().unwrap_or(url);
        let (host, path, _) = Self::parse_url_fast(base);

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();
        let credential_scope = self.credential_scope(&date_stamp);
        let credential = format!("{}/{}", self.access_key, credential_scope);
        let expires = expires_secs.to_string();

        let mut params: Vec<(String, String)> = [
            ("X-Amz-Algorithm", ALGORITHM),
            ("X-Amz-Credential", credential.as_str()),
            ("X-Amz-Date", amz_date.as_str()),
            ("X-Amz-Expires", expires.as_str()),
            ("X-Amz-SignedHeaders", "host"),
        ]
        .iter()
        .chain(extra_query.iter())
        .map(|(k, v)| (Self::uri_encode(k, true), Self::uri_encode(v, true)))
        .collect();
        params.sort_unstable();

        let canonical_query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
            method, path, canonical_query, host, UNSIGNED_PAYLOAD
        );
        tracing::trace!(%method, %url, %canonical_request, "SigV4 presign canonical request");

        let string_to_sign = Self::string_to_sign(&amz_date, &credential_scope, &canonical_request);
        let signature = self.calculate_signature(&date_stamp, &string_to_sign);

        format!("{}?{}&X-Amz-Signature={}", base, canonical_query, signature)
    }

    fn credential_scope(&self, date_stamp: &str) -> String {
        format!("{}/{}/{}/aws4_request", date_stamp, self.region, self.service)
    }

    fn string_to_sign(amz_date: &str, credential_scope: &str, canonical_request: &str) -> String {
        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM, amz_date, credential_scope, canonical_request_hash
        )
    }

    /// Returns (host_with_port, path, query) as slices into the URL.
    /// Default ports (:443 for https, :80 for http) are stripped from the host.
    fn parse_url_fast(url: &str) -> (&str, &str, &str) {
        let after_scheme = if let Some(rest) = url.strip_prefix("https://") {
            rest
        } else if let Some(rest) = url.strip_prefix("http://") {
            rest
        } else {
            url
        };

        let (authority, path_and_query) = match after_scheme.find('/') {
            Some(pos) => (&after_scheme[..pos], &after_scheme[pos..]),
            None => (after_scheme, "/"),
        };

        let (path, query) = match path_and_query.find('?') {
            Some(pos) => (&path_and_query[..pos], &path_and_query[pos + 1..]),
            None => (path_and_query, ""),
        };

        let host = if url.starts_with("https") {
            authority.strip_suffix(":443").unwrap_or(authority)
        } else {
            authority.strip_suffix(":80").unwrap_or(authority)
        };

        (host, path, query)
    }

    /// Create canonical query string (sorted by parameter name)
    ///
    /// Fast path: if every byte is already canonical, parameters are sorted
    /// and all have `=`, the query is returned as-is.
    fn create_canonical_query_string(query: &str) -> String {
        if query.is_empty() {
            return String::new();
        }

        let all_canonical = query.bytes().all(|b| matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
            | b'-' | b'_' | b'.' | b'~'
            | b'=' | b'&' | b'%'
        ));

        if all_canonical {
            let mut sorted = true;
            let mut all_have_equals = true;
            let mut last_key: &str = "";
            for pair in query.split('&') {
                let key = match pair.find('=') {
                    Some(pos) => &pair[..pos],
                    None => {
                        all_have_equals = false;
                        pair
                    }
                };
                if key < last_key {
                    sorted = false;
                    break;
                }
                last_key = key;
            }
            if sorted && all_have_equals {
                return query.to_string();
            }
        }

        // Slow path: decode, re-encode, sort
        let mut params: Vec<(String, String)> = Vec::new();
        for pair in query.split('&') {
            if let Some(pos) = pair.find('=') {
                let key = &pair[..pos];
                let value = &pair[pos + 1..];
                let decoded_key = urlencoding::decode(key).unwrap_or_else(|_| key.into());
                let decoded_value =
                    urlencoding::decode(value).unwrap_or_else(|_| value.into());
                params.push((
                    Self::uri_encode(&decoded_key, true),
                    Self::uri_encode(&decoded_value, true),
                ));
            } else {
                let decoded = urlencoding::decode(pair).unwrap_or_else(|_| pair.into());
                params.push((Self::uri_encode(&decoded, true), String::new()));
            }
        }

        params.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Keys are already lowercase and sorted by BTreeMap
    fn create_canonical_headers(headers: &BTreeMap<String, String>) -> String {
        let mut result = String::with_capacity(headers.len() * 64);
        for (k, v) in headers {
            result.push_str(k);
            result.push(':');
            // Trimmed, with inner whitespace runs folded to one space
            for (i, word) in v.split_whitespace().enumerate() {
                if i > 0 {
                    result.push(' ');
                }
                result.push_str(word);
            }
            result.push('\n');
        }
        result
    }

    fn create_signed_headers(headers: &BTreeMap<String, String>) -> String {
        headers.keys().map(String::as_str).collect::<Vec<_>>().join(";")
    }

    /// Calculate the signature with daily signing key cache
    fn calculate_signature(&self, date_stamp: &str, string_to_sign: &str) -> String {
        let signing_key = {
            let mut cache = self.cached_signing_key.lock().unwrap();
            match cache.as_ref() {
                Some((cached_date, cached_key)) if cached_date == date_stamp => *cached_key,
                _ => {
                    let key = self.derive_signing_key(date_stamp);
                    *cache = Some((date_stamp.to_string(), key));
                    key
                }
            }
        };

        hex::encode(Self::hmac_sha256(&signing_key, string_to_sign.as_bytes()))
    }

    /// Derive signing key from date stamp (4 chained HMAC operations)
    fn derive_signing_key(&self, date_stamp: &str) -> [u8; 32] {
        let k_date = Self::hmac_sha256(&self.aws4_key, date_stamp.as_bytes());
        let k_region = Self::hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = Self::hmac_sha256(&k_region, self.service.as_bytes());
        Self::hmac_sha256(&k_service, b"aws4_request")
    }

    fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(msg);
        let result = mac.finalize().into_bytes();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        output
    }

    /// URI encode a string (RFC 3986) using hex lookup table
    pub(crate) fn uri_encode(s: &str, encode_slash: bool) -> String {
        let mut result = String::with_capacity(s.len() + 16);
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char);
                }
                b'/' if !encode_slash => {
                    result.push('/');
                }
                _ => {
                    result.push('%');
                    result.push(HEX_UPPER[(byte >> 4) as usize] as char);
                    result.push(HEX_UPPER[(byte & 0xf) as usize] as char);
                }
            }
        }
        result
    }
}
