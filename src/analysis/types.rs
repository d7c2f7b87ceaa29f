//! Structured analysis result types.

use serde::{Deserialize, Serialize};

/// Structured result of one song analysis.
///
/// Mirrors the wire contract field for field: every field is required, and
/// a response missing any of them is rejected as malformed rather than
/// patched with defaults. `themes` preserves the model's output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAnalysis {
    /// Song title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// Full lyrics; empty string if none were found.
    pub lyrics: String,
    /// Genre label.
    pub genre: String,
    /// Mood label.
    pub mood: String,
    /// Themes in model output order.
    pub themes: Vec<String>,
    /// Free-form musical commentary.
    pub musical_analysis: String,
}
