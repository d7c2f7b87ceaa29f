//! Preview resource management.
//!
//! The presentation layer displays the uploaded media without re-reading
//! it from the analysis client. The handle is a locally resolvable path
//! to a copy of the bytes, released explicitly when a new upload
//! supersedes it or the session resets. Drop is a backstop so the file
//! cannot outlive the handle.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::MediaError;

/// A locally resolvable reference to the uploaded media's bytes.
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
    mime_type: String,
    released: bool,
}

impl PreviewHandle {
    /// Allocate a preview resource for the given bytes.
    pub async fn create(data: &[u8], mime_type: &str) -> Result<Self, MediaError> {
        let ext = extension_for(mime_type);
        let path = std::env::temp_dir().join(format!("lyriclens-preview-{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| MediaError::PreviewFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;
        Ok(Self {
            path,
            mime_type: mime_type.to_string(),
            released: false,
        })
    }

    /// Path the presentation layer can resolve.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type of the previewed media.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the underlying resource has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Explicitly release the resource. Idempotent.
    pub fn release(&mut self) {
        if !self.released {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove preview {}: {}", self.path.display(), e);
                }
            }
            self.released = true;
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_writes_resolvable_file() {
        let mut preview = PreviewHandle::create(b"bytes", "audio/mpeg").await.unwrap();
        assert!(preview.path().exists());
        assert_eq!(preview.mime_type(), "audio/mpeg");
        assert!(!preview.is_released());
        preview.release();
    }

    #[tokio::test]
    async fn test_release_removes_file_and_is_idempotent() {
        let mut preview = PreviewHandle::create(b"bytes", "audio/wav").await.unwrap();
        let path = preview.path().to_path_buf();
        preview.release();
        assert!(!path.exists());
        assert!(preview.is_released());
        // Second release is a no-op.
        preview.release();
        assert!(preview.is_released());
    }

    #[tokio::test]
    async fn test_drop_releases_resource() {
        let path;
        {
            let preview = PreviewHandle::create(b"bytes", "video/mp4").await.unwrap();
            path = preview.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unknown_mime_gets_bin_extension() {
        let mut preview = PreviewHandle::create(b"x", "application/x-unknown-thing")
            .await
            .unwrap();
        assert!(preview.path().to_string_lossy().ends_with(".bin"));
        preview.release();
    }
}
