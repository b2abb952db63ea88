//! CLI command implementations

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::cli::args::{format_bytes, guess_content_type, parse_metadata};
use crate::facade::StorageFacade;
use crate::s3::{BucketAcl, CreateBucketRequest, ListBucketsFilter, ObjectStore, UploadOptions};

/// List buckets command
pub async fn cmd_buckets<P: ObjectStore>(
    facade: &StorageFacade<P>,
    prefix: Option<String>,
    max_buckets: Option<i32>,
    json: bool,
) -> Result<()> {
    let filter = ListBucketsFilter {
        prefix,
        max_buckets,
        ..Default::default()
    };
    let output = facade.list_buckets(filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for bucket in &output.buckets {
        println!(
            "[{}] {}/",
            bucket.creation_date.as_deref().unwrap_or("-"),
            bucket.name
        );
    }
    if let Some(token) = &output.continuation_token {
        println!("(more buckets available, continuation token: {})", token);
    }

    Ok(())
}

/// Make bucket command
pub async fn cmd_mb<P: ObjectStore>(
    facade: &StorageFacade<P>,
    bucket: &str,
    acl: Option<&str>,
    location: Option<&str>,
    object_lock: bool,
) -> Result<()> {
    let mut request = CreateBucketRequest::new(bucket);
    if let Some(acl) = acl {
        request = request.with_acl(acl.parse::<BucketAcl>().map_err(anyhow::Error::msg)?);
    }
    if let Some(location) = location {
        request = request.with_location_constraint(location);
    }
    if object_lock {
        request = request.with_object_lock(true);
    }

    let output = facade.create_bucket(request).await?;
    println!("Bucket created: {} ({})", bucket, output.location);

    Ok(())
}

/// Upload a local file
pub async fn cmd_put<P: ObjectStore>(
    facade: &StorageFacade<P>,
    file: &Path,
    bucket: &str,
    key: Option<&str>,
    content_type: Option<&str>,
    meta: &[String],
) -> Result<()> {
    let data = tokio::fs::File::open(file)
        .await
        .context(format!("Failed to open {}", file.display()))?;
    let size = data
        .metadata()
        .await
        .context(format!("Failed to stat {}", file.display()))?
        .len();

    let key = match key {
        Some(key) => key.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Cannot derive object key from {}", file.display()))?,
    };
    let content_type = content_type
        .map(str::to_string)
        .unwrap_or_else(|| guess_content_type(file));
    let metadata = parse_metadata(meta)?;

    debug!(file = %file.display(), size, %content_type, "Uploading file");

    let output = facade
        .upload_stream(
            data,
            &key,
            bucket,
            &content_type,
            UploadOptions::with_metadata(metadata),
        )
        .await?;

    println!("Uploaded {} ({})", output.location, format_bytes(size));
    if let Some(etag) = &output.etag {
        println!("ETag: {}", etag);
    }

    Ok(())
}

/// Download an object to a file, or describe it on stdout
pub async fn cmd_get<P: ObjectStore>(
    facade: &StorageFacade<P>,
    key: &str,
    bucket: &str,
    output: Option<&Path>,
) -> Result<()> {
    let document = facade.get_document(key, bucket).await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &document.body)
                .await
                .context(format!("Failed to write {}", path.display()))?;
            println!(
                "Saved {}/{} to {} ({})",
                bucket,
                key,
                path.display(),
                format_bytes(document.body.len() as u64)
            );
        }
        None => {
            println!("Object: {}/{}", bucket, key);
            println!("Size: {}", format_bytes(document.body.len() as u64));
            println!(
                "Content-Type: {}",
                document.content_type.as_deref().unwrap_or("Unknown")
            );
            println!(
                "Last Modified: {}",
                document.last_modified.as_deref().unwrap_or("Unknown")
            );
            if let Some(etag) = &document.etag {
                println!("ETag: {}", etag);
            }
            for (name, value) in &document.metadata {
                println!("Meta {}: {}", name, value);
            }
        }
    }

    Ok(())
}

/// Print a presigned GET URL
pub fn cmd_presign<P: ObjectStore>(
    facade: &StorageFacade<P>,
    bucket: &str,
    key: &str,
    filename: Option<&str>,
    expiry: u64,
) -> Result<()> {
    let url = facade.get_signed_url(bucket, key, filename, Some(expiry))?;
    println!("{}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::MemoryStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get_to_file() {
        let facade = StorageFacade::new(MemoryStore::default());
        cmd_mb(&facade, "file-uploads", Some("private"), None, false)
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("s3.png");
        std::fs::write(&source, b"png bytes").unwrap();

        cmd_put(&facade, &source, "file-uploads", None, None, &["owner=ops".to_string()])
            .await
            .unwrap();

        let stored = facade.get_document("s3.png", "file-uploads").await.unwrap();
        assert_eq!(stored.content_type.as_deref(), Some("image/png"));
        assert_eq!(stored.metadata["owner"], "ops");

        let target = dir.path().join("copy.png");
        cmd_get(&facade, "s3.png", "file-uploads", Some(&target))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_mb_rejects_unknown_acl() {
        let facade = StorageFacade::new(MemoryStore::default());
        assert!(cmd_mb(&facade, "b", Some("everyone"), None, false).await.is_err());
    }

    #[tokio::test]
    async fn test_get_missing_object_fails() {
        let facade = StorageFacade::new(MemoryStore::default());
        assert!(cmd_get(&facade, "nope", "nobucket", None).await.is_err());
    }
}
