//! Process-level configuration.
//!
//! All settings come from environment variables (optionally via a `.env`
//! file loaded in `main`). The API key is deliberately optional at load
//! time: a missing key surfaces as an authentication failure on the first
//! analysis attempt, not as a startup error, so the server and CLI stay
//! usable for inspection without a credential.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Gemini model used for song analysis.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default bind address for `lyriclens serve`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Gemini API key. `None` if `GEMINI_API_KEY` is unset or empty.
    pub api_key: Option<SecretString>,
    /// Model identifier sent to the analysis service.
    pub model: String,
    /// Bind address for the web surface.
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let model =
            std::env::var("LYRICLENS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let bind_addr = std::env::var("LYRICLENS_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr =
            bind_addr
                .parse()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "LYRICLENS_BIND_ADDR".to_string(),
                    message: format!("{}: {}", bind_addr, e),
                })?;

        Ok(Self {
            api_key,
            model,
            bind_addr,
        })
    }

    /// Whether a credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default addr parses"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.has_api_key());
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.bind_addr.port(), 8787);
    }

    #[test]
    fn test_default_model_is_flash_preview() {
        assert_eq!(DEFAULT_MODEL, "gemini-3-flash-preview");
    }
}
