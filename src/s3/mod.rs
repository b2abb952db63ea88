//! S3 provider layer
//!
//! This module provides:
//! - The `ObjectStore` trait every provider implements
//! - AWS Signature Version 4 header signing and URL presigning
//! - `S3Client`, the hyper-based REST provider
//! - `MemoryStore`, an in-process provider double
//! - Request and response structures shared by both

pub mod client;
pub mod memory;
pub mod signer;
pub mod store;
pub mod types;

pub use client::{S3Client, S3Error, Result};
pub use memory::{MemoryError, MemoryStore};
pub use signer::S3SignerV4;
pub use store::ObjectStore;
pub use types::{
    Bucket, BucketAcl, CreateBucketOutput, CreateBucketRequest, GetObjectOutput,
    ListBucketsFilter, ListBucketsOutput, ObjectOwnership, ObjectReference, Owner,
    SignedUrlRequest, UploadOptions, UploadOutput, UploadRequest, DEFAULT_SIGNED_URL_EXPIRY,
};
