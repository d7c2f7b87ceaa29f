//! Error types for LyricLens.

/// Top-level error type for the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Media intake and encoding errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No file selected")]
    InvalidInput,

    #[error("Failed to encode media: {reason}")]
    EncodingFailed { reason: String },

    #[error("Failed to allocate preview: {reason}")]
    PreviewFailed { reason: String },
}

/// Analysis service errors. Each kind is terminal for the current attempt;
/// recovery is a new upload, never an automatic retry.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis service returned no textual payload")]
    EmptyResponse,

    #[error("Malformed analysis response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Analysis service request failed: {reason}")]
    Service { reason: String },

    #[error("Analysis service rejected the credential")]
    Auth,
}

/// Web surface errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {reason}")]
    BindFailed { addr: String, reason: String },

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, Error>;
