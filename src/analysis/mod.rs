//! Song analysis client.
//!
//! Packages encoded media plus a fixed instruction and a structured-output
//! schema into one request to the analysis service, and decodes the
//! structured response.

mod gemini;
mod provider;
mod schema;
mod types;

pub use gemini::{GeminiAnalyzer, GeminiConfig};
pub use provider::SongAnalyzer;
pub use schema::{ANALYSIS_INSTRUCTION, SCHEMA_VERSION, response_schema};
pub use types::SongAnalysis;
