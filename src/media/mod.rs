//! Media handling module.
//!
//! Provides the intake side of the analysis pipeline:
//! - MIME type detection and audio/video classification
//! - File intake (path or uploaded bytes)
//! - Transport-safe payload encoding (base64)
//! - Preview resource management

mod detection;
mod encoding;
mod intake;
mod preview;

pub use detection::{MediaInfo, MediaKind, classify_mime, detect_mime_type};
pub use encoding::EncodedPayload;
pub use intake::{MAX_ADVISORY_BYTES, MediaFile};
pub use preview::PreviewHandle;
