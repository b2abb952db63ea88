//! CLI module for s3facade
//!
//! One subcommand per storage operation:
//!
//! ```bash
//! # List buckets
//! s3facade buckets --prefix logs
//!
//! # Create a bucket
//! s3facade mb file-uploads --acl private --location ap-south-1
//!
//! # Upload a file with metadata
//! s3facade put ./s3.png file-uploads --meta owner=ops
//!
//! # Download an object
//! s3facade get s3.png file-uploads --output ./s3.png
//!
//! # Presigned download link
//! s3facade presign file-uploads s3.png --filename report.png --expiry 300
//! ```

pub mod args;
pub mod commands;
