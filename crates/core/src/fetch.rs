use crate::error::FetchError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Blob storage seam: fetch raw bytes for a `(bucket, key)` pair.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError>;
}

/// Filesystem-backed blob store; the bucket is a directory root and
/// keys are paths relative to it.
#[derive(Debug, Default)]
pub struct FsBlobStore;

#[async_trait]
impl BlobFetcher for FsBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        let path = Path::new(bucket).join(key);
        tokio::fs::read(&path).await.map_err(|error| match error.kind() {
            ErrorKind::NotFound => FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            ErrorKind::PermissionDenied => FetchError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => FetchError::Transient(error.to_string()),
        })
    }
}

/// Recursively discovers PDF keys under a bucket directory, sorted for
/// stable processing order.
pub fn discover_pdf_keys(bucket: &Path) -> Vec<String> {
    let mut keys = Vec::new();

    for entry in WalkDir::new(bucket).into_iter().filter_map(|item| item.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            let key = entry
                .path()
                .strip_prefix(bucket)
                .map(PathBuf::from)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            keys.push(key.to_string_lossy().replace('\\', "/"));
        }
    }

    keys.sort_unstable();
    keys
}
