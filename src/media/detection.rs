//! MIME type detection and audio/video classification.

use std::path::Path;

/// Broad classification of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// MP3, WAV, OGG, FLAC, M4A audio.
    Audio,
    /// MP4, MOV, WebM, MKV video.
    Video,
    /// Anything else. Forwarded as-is; the analysis service decides.
    Unknown,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Information about a detected media file.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Detected MIME type (e.g., "audio/mpeg").
    pub mime_type: String,
    /// Classified media kind.
    pub kind: MediaKind,
    /// File size in bytes.
    pub size: usize,
}

/// Classify a MIME type string by its prefix.
pub fn classify_mime(mime: &str) -> MediaKind {
    if mime.starts_with("audio/") {
        MediaKind::Audio
    } else if mime.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Unknown
    }
}

/// Detect MIME type from file content (magic bytes) or extension.
pub fn detect_mime_type(data: &[u8], filename: Option<&str>) -> MediaInfo {
    let mime = detect_from_magic(data)
        .map(str::to_string)
        .or_else(|| filename.and_then(detect_from_extension))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let kind = classify_mime(&mime);

    MediaInfo {
        mime_type: mime,
        kind,
        size: data.len(),
    }
}

/// Detect MIME type from magic bytes.
fn detect_from_magic(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    // MP3
    if data.starts_with(&[0xFF, 0xFB])
        || data.starts_with(&[0xFF, 0xF3])
        || data.starts_with(&[0xFF, 0xF2])
        || data.starts_with(b"ID3")
    {
        return Some("audio/mpeg");
    }

    // OGG
    if data.starts_with(b"OggS") {
        return Some("audio/ogg");
    }

    // FLAC
    if data.starts_with(b"fLaC") {
        return Some("audio/flac");
    }

    // WAV
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
        return Some("audio/wav");
    }

    // MP4/M4A/MOV share the ftyp box
    if data.len() >= 8 && (&data[4..8] == b"ftyp" || &data[4..8] == b"moov") {
        if data.len() >= 12 && &data[8..12] == b"M4A " {
            return Some("audio/mp4");
        }
        if data.len() >= 12 && &data[8..12] == b"qt  " {
            return Some("video/quicktime");
        }
        return Some("video/mp4");
    }

    // WebM/MKV (EBML header)
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/webm");
    }

    None
}

/// Detect MIME type from the file extension.
fn detect_from_extension(filename: &str) -> Option<String> {
    let path = Path::new(filename);
    path.extension()?;
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mp3_id3() {
        let data = b"ID3\x04\x00\x00\x00\x00\x00";
        let info = detect_mime_type(data, None);
        assert_eq!(info.mime_type, "audio/mpeg");
        assert_eq!(info.kind, MediaKind::Audio);
    }

    #[test]
    fn test_detect_mp3_frame_sync() {
        let data = [0xFF, 0xFB, 0x90, 0x00];
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "audio/mpeg");
    }

    #[test]
    fn test_detect_ogg() {
        let data = b"OggS\x00\x02\x00\x00";
        let info = detect_mime_type(data, None);
        assert_eq!(info.mime_type, "audio/ogg");
        assert_eq!(info.kind, MediaKind::Audio);
    }

    #[test]
    fn test_detect_flac() {
        let data = b"fLaC\x00\x00\x00\x22";
        let info = detect_mime_type(data, None);
        assert_eq!(info.mime_type, "audio/flac");
    }

    #[test]
    fn test_detect_wav() {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"WAVE");
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "audio/wav");
    }

    #[test]
    fn test_detect_mp4() {
        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"isom");
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "video/mp4");
        assert_eq!(info.kind, MediaKind::Video);
    }

    #[test]
    fn test_detect_m4a() {
        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"M4A ");
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "audio/mp4");
        assert_eq!(info.kind, MediaKind::Audio);
    }

    #[test]
    fn test_detect_mov() {
        let mut data = vec![0x00, 0x00, 0x00, 0x14];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"qt  ");
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "video/quicktime");
        assert_eq!(info.kind, MediaKind::Video);
    }

    #[test]
    fn test_detect_webm() {
        let data = [0x1A, 0x45, 0xDF, 0xA3, 0x42, 0x86];
        let info = detect_mime_type(&data, None);
        assert_eq!(info.mime_type, "video/webm");
        assert_eq!(info.kind, MediaKind::Video);
    }

    #[test]
    fn test_extension_fallback() {
        let data = b"not a recognizable header";
        let info = detect_mime_type(data, Some("song.mp3"));
        assert_eq!(info.mime_type, "audio/mpeg");
        assert_eq!(info.kind, MediaKind::Audio);
    }

    #[test]
    fn test_unknown_type_is_forwarded_not_rejected() {
        let data = b"plain text content here";
        let info = detect_mime_type(data, Some("notes.txt"));
        assert_eq!(info.kind, MediaKind::Unknown);
        assert!(!info.mime_type.is_empty());
    }

    #[test]
    fn test_no_filename_no_magic_is_octet_stream() {
        let data = b"????";
        let info = detect_mime_type(data, None);
        assert_eq!(info.mime_type, "application/octet-stream");
        assert_eq!(info.kind, MediaKind::Unknown);
    }

    #[test]
    fn test_classify_mime_prefixes() {
        assert_eq!(classify_mime("audio/mpeg"), MediaKind::Audio);
        assert_eq!(classify_mime("video/mp4"), MediaKind::Video);
        assert_eq!(classify_mime("application/pdf"), MediaKind::Unknown);
    }

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Audio.to_string(), "audio");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!(MediaKind::Unknown.to_string(), "unknown");
    }
}
