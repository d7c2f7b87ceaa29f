//! File intake for the analysis pipeline.
//!
//! A [`MediaFile`] owns the selected file's bytes for the duration of one
//! analysis attempt. Intake never rejects on type: the picker filter is a
//! UI hint, and an unexpected MIME type is forwarded to the analysis
//! service unchanged.

use std::path::Path;

use crate::error::MediaError;
use crate::media::detection::{self, MediaInfo, MediaKind};

/// Advisory upload limit shown to the user. Not enforced: an oversized
/// file is forwarded and may fail at the analysis service instead.
pub const MAX_ADVISORY_BYTES: usize = 100 * 1024 * 1024;

/// An uploaded media file, owned transiently for one analysis attempt.
#[derive(Debug, Clone)]
pub struct MediaFile {
    data: Vec<u8>,
    mime_type: String,
    kind: MediaKind,
}

impl MediaFile {
    /// Read a file from disk. Fails with `EncodingFailed` if the file
    /// cannot be read, which ends the attempt with no partial result.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| MediaError::EncodingFailed {
                reason: format!("Failed to read {}: {}", path.display(), e),
            })?;
        let filename = path.file_name().map(|n| n.to_string_lossy().to_string());
        Ok(Self::from_bytes(data, None, filename.as_deref()))
    }

    /// Wrap bytes received from an upload. A declared MIME type (from the
    /// multipart part) wins over detection; detection fills the gap when
    /// the client sent none or sent `application/octet-stream`.
    pub fn from_bytes(data: Vec<u8>, declared_mime: Option<&str>, filename: Option<&str>) -> Self {
        let detected = detection::detect_mime_type(&data, filename);
        let mime_type = match declared_mime {
            Some(m) if !m.is_empty() && m != "application/octet-stream" => m.to_string(),
            _ => detected.mime_type,
        };
        let kind = detection::classify_mime(&mime_type);
        Self {
            data,
            mime_type,
            kind,
        }
    }

    /// Declared MIME type of the file.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Audio/video classification.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Borrow the raw bytes (used to allocate the preview resource).
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether the file exceeds the advisory limit shown in the UI.
    pub fn exceeds_advisory_limit(&self) -> bool {
        self.data.len() > MAX_ADVISORY_BYTES
    }

    /// Detection summary for logging.
    pub fn info(&self) -> MediaInfo {
        MediaInfo {
            mime_type: self.mime_type.clone(),
            kind: self.kind,
            size: self.data.len(),
        }
    }

    /// Consume the file, yielding its bytes.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
