//! Analysis provider seam.

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::media::EncodedPayload;

use super::types::SongAnalysis;

/// Trait for song analysis providers.
///
/// One call is one attempt: a single round trip, no retry, no streaming.
/// Every failure kind is terminal; the caller restarts the pipeline to
/// try again.
#[async_trait]
pub trait SongAnalyzer: Send + Sync {
    /// Analyze an encoded media payload.
    async fn analyze(&self, payload: EncodedPayload) -> Result<SongAnalysis, AnalysisError>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is configured with a credential.
    fn is_available(&self) -> bool;
}
