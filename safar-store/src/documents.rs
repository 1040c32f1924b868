use chrono::Utc;
use safar_core::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Extensions accepted for passport scans, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "pdf", "webp"];

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Reference kept on the booking, e.g. `uploads/1715000000000-1a2b3c4d.pdf`.
    pub reference: String,
    pub path: PathBuf,
}

impl StoredDocument {
    /// Hands the file to a guard that deletes it on drop unless kept.
    pub fn pending(self) -> PendingDocument {
        PendingDocument { document: self, kept: false }
    }
}

/// A stored file whose owning record is not committed yet. Dropping it without
/// calling [`PendingDocument::keep`] removes the file, which also covers the
/// request future being cancelled mid-commit.
#[derive(Debug)]
pub struct PendingDocument {
    document: StoredDocument,
    kept: bool,
}

impl PendingDocument {
    pub fn reference(&self) -> &str {
        &self.document.reference
    }

    /// Releases the guard once the record referencing the file is committed.
    pub fn keep(mut self) -> String {
        self.kept = true;
        std::mem::take(&mut self.document.reference)
    }
}

impl Drop for PendingDocument {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        // Sync removal: drop cannot await.
        match std::fs::remove_file(&self.document.path) {
            Ok(()) => debug!("Discarded uncommitted document {}", self.document.reference),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to discard document {}: {}", self.document.reference, e),
        }
    }
}

/// Filesystem store for uploaded passport documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lower-cased extension of `file_name` when it is on the allow-list.
    pub fn accepted_extension(file_name: &str) -> CoreResult<String> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(CoreError::UploadRejected(format!(
                "Only {} files are allowed",
                ALLOWED_EXTENSIONS.join(", ")
            )))
        }
    }

    /// Writes the file under a timestamp-prefixed name. The client's file name
    /// only contributes its extension.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> CoreResult<StoredDocument> {
        let ext = Self::accepted_extension(original_name)?;
        let simple = Uuid::new_v4().simple().to_string();
        let name = format!("{}-{}.{}", Utc::now().timestamp_millis(), &simple[..8], ext);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Storage(format!("upload directory: {}", e)))?;

        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Storage(format!("upload write: {}", e)))?;

        debug!("Stored document {} ({} bytes)", name, bytes.len());
        Ok(StoredDocument {
            reference: format!("{}/{}", PUBLIC_PREFIX, name),
            path,
        })
    }

    /// Deletes a stored document by its booking reference. Missing files are ignored.
    pub async fn remove(&self, reference: &str) {
        let Some(name) = reference
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
        else {
            warn!("Ignoring unexpected document reference {}", reference);
            return;
        };

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => debug!("Removed document {}", name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove document {}: {}", name, e),
        }
    }
}
