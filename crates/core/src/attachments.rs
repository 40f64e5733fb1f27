//! Attachment storage interface used by file fields.
//!
//! The form engine only needs two operations from a blob store: store bytes
//! and delete a stored blob. Uploads for one submission go through
//! [`store_all`], which either stores every file or removes the ones it
//! already wrote and fails.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// A file received with a submission, not yet stored.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub field_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl PendingUpload {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Metadata shape validated by file fields before anything is stored.
    pub fn describe(&self) -> Value {
        serde_json::json!({
            "file_name": self.file_name,
            "content_type": self.content_type,
            "size": self.size(),
        })
    }
}

/// Reference to a stored attachment, persisted inside submission responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Store-specific key used to fetch or delete the blob.
    pub key: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn put(&self, upload: &PendingUpload) -> Result<AttachmentRef, CoreError>;

    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Store every upload or none of them.
///
/// On the first failure, blobs written so far are deleted and the error is
/// returned.
pub async fn store_all(
    store: &dyn AttachmentStore,
    uploads: &[PendingUpload],
) -> Result<Vec<(String, AttachmentRef)>, CoreError> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match store.put(upload).await {
            Ok(reference) => stored.push((upload.field_id.clone(), reference)),
            Err(err) => {
                tracing::warn!(
                    field_id = %upload.field_id,
                    file_name = %upload.file_name,
                    error = %err,
                    "Attachment upload failed, rolling back stored files"
                );
                let refs: Vec<AttachmentRef> = stored.into_iter().map(|(_, r)| r).collect();
                discard_all(store, &refs).await;
                return Err(match err {
                    CoreError::Attachment(msg) => CoreError::Attachment(msg),
                    other => CoreError::Attachment(other.to_string()),
                });
            }
        }
    }
    Ok(stored)
}

/// Best-effort removal of stored blobs. Failures are logged, not returned.
pub async fn discard_all(store: &dyn AttachmentStore, refs: &[AttachmentRef]) {
    for reference in refs {
        if let Err(err) = store.delete(&reference.key).await {
            tracing::error!(key = %reference.key, error = %err, "Failed to delete orphaned attachment");
        }
    }
}

// ---------------------------------------------------------------------------
// Local filesystem store
// ---------------------------------------------------------------------------

/// Stores attachments as files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    base_dir: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CoreError::Attachment(format!("Invalid attachment key '{key}'")));
        }
        Ok(self.base_dir.join(key))
    }
}

/// Keep the extension of the original name, if it is short and plain.
fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let plain = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plain.then(|| ext.to_ascii_lowercase())
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn put(&self, upload: &PendingUpload) -> Result<AttachmentRef, CoreError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| CoreError::Attachment(e.to_string()))?;

        let key = match extension_of(&upload.file_name) {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4().simple()),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let path = self.path_for(&key)?;
        tokio::fs::write(&path, &upload.data)
            .await
            .map_err(|e| CoreError::Attachment(e.to_string()))?;

        Ok(AttachmentRef {
            key,
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size: upload.size(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Attachment(e.to_string())),
        }
    }
}
