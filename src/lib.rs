//! s3facade - thin async facade over S3-compatible object storage

pub mod cli;
pub mod config;
pub mod facade;
pub mod s3;

pub use config::Config;
pub use facade::{StorageFacade, StreamUploadError};
