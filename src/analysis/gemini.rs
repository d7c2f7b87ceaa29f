//! Google Gemini analysis client.
//!
//! Sends the encoded media inline to the Google Generative AI REST API
//! with a structured-output schema and decodes the JSON body into a
//! [`SongAnalysis`]. Uses API key authentication.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::media::EncodedPayload;

use super::provider::SongAnalyzer;
use super::schema::{ANALYSIS_INSTRUCTION, response_schema};
use super::types::SongAnalysis;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; `None` makes every attempt fail with an auth error.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Create a new Gemini config with the default base URL.
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Gemini-backed song analyzer.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiAnalyzer {
    /// Create a new Gemini analyzer.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Build the generateContent URL for the configured model.
    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, api_key
        )
    }

    /// Build the request body for one analysis attempt.
    fn build_request(payload: &EncodedPayload) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: payload.mime_type().to_string(),
                            data: payload.data().to_string(),
                        },
                    },
                    GeminiPart::Text {
                        text: ANALYSIS_INSTRUCTION.to_string(),
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }

    /// Pull the textual payload out of a response. `None` when the service
    /// returned no candidates or no text parts.
    fn extract_text(response: GeminiResponse) -> Option<String> {
        let candidate = response.candidates?.into_iter().next()?;
        let parts = candidate.content?.parts;
        let text: String = parts
            .into_iter()
            .filter_map(|p| match p {
                GeminiPart::Text { text } => Some(text),
                _ => None,
            })
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Decode the textual payload against the required-field contract.
    /// Missing fields are an error, never defaulted.
    fn decode_analysis(text: &str) -> Result<SongAnalysis, AnalysisError> {
        serde_json::from_str(text).map_err(|e| AnalysisError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl SongAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, payload: EncodedPayload) -> Result<SongAnalysis, AnalysisError> {
        let Some(ref api_key) = self.config.api_key else {
            return Err(AnalysisError::Auth);
        };

        let request = Self::build_request(&payload);
        let url = self.build_url(api_key.expose_secret());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Service {
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AnalysisError::Auth);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<GeminiErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.map(|d| d.message))
                .unwrap_or(error_text);
            return Err(AnalysisError::Service {
                reason: format!("Status {}: {}", status, msg),
            });
        }

        let gemini_resp: GeminiResponse =
            response.json().await.map_err(|e| AnalysisError::Service {
                reason: format!("Failed to parse response envelope: {}", e),
            })?;

        let text = Self::extract_text(gemini_resp).ok_or(AnalysisError::EmptyResponse)?;
        Self::decode_analysis(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> EncodedPayload {
        let file =
            crate::media::MediaFile::from_bytes(b"ID3\x04tiny".to_vec(), Some("audio/mpeg"), None);
        EncodedPayload::encode(file)
    }

    const FULL_BODY: &str = r#"{"title":"Song","artist":"Artist","lyrics":"la la","genre":"pop","mood":"happy","themes":["love","summer"],"musicalAnalysis":"upbeat"}"#;

    #[test]
    fn test_build_url() {
        let config = GeminiConfig::new(
            Some(SecretString::from("test-key-123".to_string())),
            "gemini-3-flash-preview",
        );
        let analyzer = GeminiAnalyzer::new(config);
        let url = analyzer.build_url("test-key-123");
        assert!(url.contains("gemini-3-flash-preview:generateContent"));
        assert!(url.contains("key=test-key-123"));
    }

    #[test]
    fn test_build_request_shape() {
        let request = GeminiAnalyzer::build_request(&payload());
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/mpeg");
        assert!(parts[1]["text"].as_str().unwrap().contains("lyrics"));

        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_decode_analysis_full_body() {
        let analysis = GeminiAnalyzer::decode_analysis(FULL_BODY).unwrap();
        assert_eq!(analysis.title, "Song");
        assert_eq!(analysis.themes, vec!["love", "summer"]);
        assert_eq!(analysis.musical_analysis, "upbeat");
    }

    #[test]
    fn test_decode_analysis_missing_fields_is_malformed() {
        let err = GeminiAnalyzer::decode_analysis(r#"{"title":"X"}"#).unwrap_err();
        match err {
            AnalysisError::MalformedResponse { reason } => {
                assert!(reason.contains("missing field"));
            }
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_analysis_invalid_json_is_malformed() {
        let err = GeminiAnalyzer::decode_analysis("not json at all").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let resp = GeminiResponse { candidates: None };
        assert!(GeminiAnalyzer::extract_text(resp).is_none());

        let resp = GeminiResponse {
            candidates: Some(Vec::new()),
        };
        assert!(GeminiAnalyzer::extract_text(resp).is_none());
    }

    #[test]
    fn test_extract_text_no_text_parts() {
        let resp = GeminiResponse {
            candidates: Some(vec![GeminiCandidate {
                content: Some(GeminiContent {
                    parts: vec![GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: "audio/mpeg".into(),
                            data: "aGk=".into(),
                        },
                    }],
                }),
            }]),
        };
        assert!(GeminiAnalyzer::extract_text(resp).is_none());
    }

    #[test]
    fn test_extract_text_joins_text_parts() {
        let resp = GeminiResponse {
            candidates: Some(vec![GeminiCandidate {
                content: Some(GeminiContent {
                    parts: vec![
                        GeminiPart::Text {
                            text: "{\"a\":".into(),
                        },
                        GeminiPart::Text { text: "1}".into() },
                    ],
                }),
            }]),
        };
        assert_eq!(GeminiAnalyzer::extract_text(resp).unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_analyze_without_key_fails_auth() {
        let analyzer = GeminiAnalyzer::new(GeminiConfig::new(None, "gemini-3-flash-preview"));
        assert!(!analyzer.is_available());
        let err = analyzer.analyze(payload()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Auth));
    }

    #[test]
    fn test_default_base_url() {
        let config = GeminiConfig::new(None, "gemini-3-flash-preview");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
    }
}
