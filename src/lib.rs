//! LyricLens: upload a song, extract lyrics and structured musical
//! analysis via a hosted generative model.
//!
//! The crate is a thin orchestration layer around one external call:
//! - [`media`] — file intake, MIME classification, base64 encoding, and
//!   the preview resource
//! - [`analysis`] — the Gemini client with its structured-output contract
//! - [`session`] — the Upload-Encode-Analyze state machine and pipeline
//! - [`server`] / [`render`] — presentation collaborators (web and
//!   terminal) that consume the session's state

pub mod analysis;
pub mod error;
pub mod media;
pub mod render;
pub mod server;
pub mod session;
pub mod settings;

pub use error::{Error, Result};
