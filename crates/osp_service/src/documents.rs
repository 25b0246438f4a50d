use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use osp_core::models::document::Document;
use osp_core::validation::ValidationError;
use osp_core::Result;
use uuid::Uuid;

use crate::blob::BlobStore;

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

/// Upload limits for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPolicy {
    pub max_files: usize,
    pub max_file_bytes: usize,
    /// Folder-like prefix for object keys.
    pub key_prefix: String,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            max_files: 6,
            max_file_bytes: 5 * 1024 * 1024,
            key_prefix: "osp-requests".to_string(),
        }
    }
}

/// A file as received from the transport, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: &str, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.into(),
        }
    }
}

/// Checks uploads against the policy and hands them to the blob store.
#[derive(Clone)]
pub struct DocumentCollector {
    policy: DocumentPolicy,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentCollector {
    pub fn new(policy: DocumentPolicy, blobs: Arc<dyn BlobStore>) -> Self {
        Self { policy, blobs }
    }

    pub fn with_policy(mut self, policy: DocumentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &DocumentPolicy {
        &self.policy
    }

    /// Every policy violation, one entry per offending file. Touches nothing.
    pub fn inspect(&self, files: &[UploadedFile]) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if files.len() > self.policy.max_files {
            errors.push(ValidationError::new(
                "OSP-301",
                "documents",
                format!(
                    "at most {} files may be attached, got {}",
                    self.policy.max_files,
                    files.len()
                ),
            ));
        }

        for file in files {
            if !ALLOWED_MIME_TYPES.contains(&file.content_type.as_str()) {
                errors.push(ValidationError::new(
                    "OSP-302",
                    "documents",
                    format!(
                        "'{}' has type '{}'; only PDF/JPG/PNG allowed",
                        file.file_name, file.content_type
                    ),
                ));
            }
            if file.bytes.len() > self.policy.max_file_bytes {
                errors.push(ValidationError::new(
                    "OSP-303",
                    "documents",
                    format!(
                        "'{}' is {} bytes; the limit is {} bytes",
                        file.file_name,
                        file.bytes.len(),
                        self.policy.max_file_bytes
                    ),
                ));
            }
        }

        errors
    }

    /// Uploads every file concurrently. If any upload fails, the ones that
    /// succeeded are discarded and the first error is returned.
    pub async fn store(&self, files: Vec<UploadedFile>) -> Result<Vec<Document>> {
        let uploads = files.into_iter().map(|file| {
            let blobs = self.blobs.clone();
            let key = object_key(&self.policy.key_prefix, &file.file_name);
            async move {
                let size = file.bytes.len() as u64;
                let url = blobs.put(file.bytes, &file.content_type, &key).await?;
                Ok::<Document, osp_core::Error>(Document {
                    url,
                    original_name: file.file_name,
                    mime_type: file.content_type,
                    size,
                })
            }
        });

        let results = join_all(uploads).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(doc) => stored.push(doc),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => tracing::warn!(error = %e, "additional upload failure"),
            }
        }

        if let Some(err) = first_error {
            self.discard(&stored).await;
            return Err(err);
        }
        Ok(stored)
    }

    /// Best-effort removal of blobs that no request will reference.
    pub async fn discard(&self, documents: &[Document]) {
        for doc in documents {
            if let Err(e) = self.blobs.delete(&doc.url).await {
                tracing::warn!(url = %doc.url, error = %e, "failed to discard orphaned upload");
            }
        }
    }
}

/// `<prefix>/<uuid>_<name>` with whitespace runs folded to `_`.
fn object_key(prefix: &str, file_name: &str) -> String {
    let name = file_name.split_whitespace().collect::<Vec<_>>().join("_");
    let name = if name.is_empty() { "document".to_string() } else { name };
    format!("{}/{}_{}", prefix, Uuid::new_v4(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use async_trait::async_trait;
    use osp_core::Error;

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile::new(name, "application/pdf", &b"%PDF-1.7"[..])
    }

    #[test]
    fn object_keys_fold_whitespace() {
        let key = object_key("osp-requests", "Aadhaar  front side.pdf");
        assert!(key.starts_with("osp-requests/"));
        assert!(key.ends_with("_Aadhaar_front_side.pdf"));

        assert!(object_key("p", "   ").ends_with("_document"));
    }

    #[test]
    fn inspect_names_each_offending_file() {
        let collector = DocumentCollector::new(
            DocumentPolicy {
                max_file_bytes: 4,
                ..DocumentPolicy::default()
            },
            Arc::new(MemoryBlobStore::new()),
        );
        let files = vec![
            UploadedFile::new("ok.png", "image/png", &b"1234"[..]),
            UploadedFile::new("script.exe", "application/x-msdownload", &b"MZ"[..]),
            UploadedFile::new("big.jpg", "image/jpeg", &b"12345"[..]),
        ];

        let errors = collector.inspect(&files);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, "OSP-302");
        assert!(errors[0].message.contains("script.exe"));
        assert_eq!(errors[1].code, "OSP-303");
        assert!(errors[1].message.contains("big.jpg"));
    }

    #[test]
    fn inspect_caps_file_count() {
        let collector = DocumentCollector::new(
            DocumentPolicy {
                max_files: 2,
                ..DocumentPolicy::default()
            },
            Arc::new(MemoryBlobStore::new()),
        );
        let files = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];
        let errors = collector.inspect(&files);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "OSP-301");
    }

    #[tokio::test]
    async fn store_returns_references_in_upload_order() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let collector = DocumentCollector::new(DocumentPolicy::default(), blobs.clone());

        let docs = collector
            .store(vec![pdf("first.pdf"), UploadedFile::new("photo.jpg", "image/jpeg", &b"jpg"[..])])
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].original_name, "first.pdf");
        assert_eq!(docs[0].size, 8);
        assert_eq!(docs[1].mime_type, "image/jpeg");
        assert!(blobs.get(&docs[1].url).is_some());
        assert_eq!(blobs.len(), 2);
    }

    /// Accepts everything except files named "fail.pdf".
    struct FlakyBlobs(MemoryBlobStore);

    #[async_trait]
    impl BlobStore for FlakyBlobs {
        async fn put(&self, bytes: Bytes, content_type: &str, key: &str) -> Result<String> {
            if key.ends_with("fail.pdf") {
                return Err(Error::Storage("simulated outage".to_string()));
            }
            self.0.put(bytes, content_type, key).await
        }

        async fn delete(&self, url: &str) -> Result<()> {
            self.0.delete(url).await
        }
    }

    #[tokio::test]
    async fn partial_upload_failure_leaves_no_blobs() {
        let blobs = Arc::new(FlakyBlobs(MemoryBlobStore::new()));
        let collector = DocumentCollector::new(DocumentPolicy::default(), blobs.clone());

        let err = collector
            .store(vec![pdf("a.pdf"), pdf("fail.pdf"), pdf("b.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(blobs.0.is_empty());
    }
}
