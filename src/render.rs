//! Terminal rendering of analysis results.
//!
//! Pure presentation: consumes the structured result produced by the
//! pipeline and formats it for a terminal. Holds no state of its own.

use crate::analysis::SongAnalysis;

/// Format an analysis result as a plain-text card.
pub fn render_text(analysis: &SongAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} — {}\n", analysis.title, analysis.artist));
    out.push_str(&format!("Genre: {}   Mood: {}\n", analysis.genre, analysis.mood));
    if !analysis.themes.is_empty() {
        out.push_str(&format!("Themes: {}\n", analysis.themes.join(", ")));
    }
    out.push('\n');
    if analysis.lyrics.is_empty() {
        out.push_str("Lyrics: (none found)\n");
    } else {
        out.push_str("Lyrics:\n");
        out.push_str(&analysis.lyrics);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("Musical analysis:\n");
    out.push_str(&analysis.musical_analysis);
    out.push('\n');
    out
}
