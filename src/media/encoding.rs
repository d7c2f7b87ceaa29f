//! Transport-safe payload encoding.
//!
//! Converts an uploaded file into the base64 form the analysis request
//! embeds as inline data. Derived, immutable, consumed exactly once.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::media::intake::MediaFile;

/// A base64 rendition of a media file plus its original MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    data: String,
    mime_type: String,
}

impl EncodedPayload {
    /// Encode a media file. Consumes the file: once encoded, the raw
    /// bytes are no longer needed by the pipeline (the preview resource
    /// holds its own copy).
    pub fn encode(file: MediaFile) -> Self {
        let mime_type = file.mime_type().to_string();
        let data = STANDARD.encode(file.into_bytes());
        Self { data, mime_type }
    }

    /// Base64 text.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// MIME type of the original bytes.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_standard_base64() {
        let file = MediaFile::from_bytes(b"hello".to_vec(), Some("audio/mpeg"), None);
        let payload = EncodedPayload::encode(file);
        assert_eq!(payload.data(), "aGVsbG8=");
        assert_eq!(payload.mime_type(), "audio/mpeg");
    }

    #[test]
    fn test_encode_empty_file() {
        let file = MediaFile::from_bytes(Vec::new(), Some("audio/wav"), None);
        let payload = EncodedPayload::encode(file);
        assert_eq!(payload.data(), "");
        assert_eq!(payload.mime_type(), "audio/wav");
    }

    #[test]
    fn test_encode_round_trips() {
        let original = vec![0u8, 1, 2, 254, 255];
        let file = MediaFile::from_bytes(original.clone(), Some("video/mp4"), None);
        let payload = EncodedPayload::encode(file);
        let decoded = STANDARD.decode(payload.data()).unwrap();
        assert_eq!(decoded, original);
    }
}
