use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use osp_core::{Error, Result};
use parking_lot::Mutex;

/// External binary storage. The portal only ever sees URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns a stable retrieval URL.
    async fn put(&self, bytes: Bytes, content_type: &str, key: &str) -> Result<String>;

    /// Removes a blob previously returned by `put`.
    async fn delete(&self, url: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// S3 / MinIO
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    // "<endpoint>/<bucket>", path-style so MinIO on localhost works
    public_base: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: String, endpoint: &str) -> Self {
        let public_base = format!("{}/{}", endpoint.trim_end_matches('/'), bucket);
        Self {
            client,
            bucket,
            public_base,
        }
    }

    /// Creates the bucket on first use.
    pub async fn ensure_bucket(&self) -> Result<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        tracing::info!(bucket = %self.bucket, "creating document bucket");
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("create bucket {}: {}", self.bucket, DisplayErrorContext(&e))))?;
        Ok(())
    }

    fn key_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, bytes: Bytes, content_type: &str, key: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload {}: {}", key, DisplayErrorContext(&e))))?;

        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let key = self
            .key_for(url)
            .ok_or_else(|| Error::Storage(format!("{} is not in bucket {}", url, self.bucket)))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("delete {}: {}", key, DisplayErrorContext(&e))))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Keeps blobs in a map keyed by URL (`memory://<key>`).
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, url: &str) -> Option<StoredBlob> {
        self.objects.lock().get(url).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: Bytes, content_type: &str, key: &str) -> Result<String> {
        let url = format!("memory://{}", key);
        self.objects.lock().insert(
            url.clone(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.objects.lock().remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        let url = store
            .put(Bytes::from_static(b"%PDF-1.7"), "application/pdf", "osp-requests/a.pdf")
            .await
            .unwrap();

        assert_eq!(url, "memory://osp-requests/a.pdf");
        assert_eq!(store.get(&url).unwrap().content_type, "application/pdf");

        store.delete(&url).await.unwrap();
        assert!(store.is_empty());
    }
}
