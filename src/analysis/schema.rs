//! Structured-output contract for the analysis service.
//!
//! The response schema constrains the model to exactly the fields of
//! [`SongAnalysis`](crate::analysis::SongAnalysis). It is a versioned
//! interface: any change here is a breaking change to the client's output
//! type and must bump [`SCHEMA_VERSION`].

/// Version of the structured-output contract.
pub const SCHEMA_VERSION: u32 = 1;

/// Fixed instruction sent with every analysis request.
pub const ANALYSIS_INSTRUCTION: &str = "Analyze this audio/video song. Extract the full lyrics \
     and provide structured information about the song's title, artist, genre, mood, themes, \
     and a brief musical analysis.";

/// JSON schema declaration for the response, in the generative-language
/// API's schema dialect.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "artist": { "type": "STRING" },
            "lyrics": { "type": "STRING" },
            "genre": { "type": "STRING" },
            "mood": { "type": "STRING" },
            "themes": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "musicalAnalysis": { "type": "STRING" }
        },
        "required": ["title", "artist", "lyrics", "genre", "mood", "themes", "musicalAnalysis"]
    })
}
