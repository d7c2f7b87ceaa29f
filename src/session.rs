//! Analysis session state machine.
//!
//! One session per user interaction. The pipeline drives a single linear
//! flow (upload, encode, analyze) and every outcome-applying transition
//! carries an [`AttemptToken`], so a stray late completion from a
//! superseded attempt is discarded instead of overwriting newer state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::analysis::{SongAnalysis, SongAnalyzer};
use crate::error::{Error, MediaError};
use crate::media::{EncodedPayload, MediaFile, PreviewHandle};

/// The single user-visible failure message. The typed failure kinds exist
/// for logging and diagnostics only; at the presentation boundary they
/// all collapse to this.
pub const FAILURE_MESSAGE: &str =
    "Failed to analyze song. Please check your API key and file format.";

/// Phase of the analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    /// Waiting for an upload.
    Idle,
    /// Reading and base64-encoding the uploaded file.
    Encoding,
    /// One network round trip to the analysis service.
    Analyzing,
    /// Terminal: holds the structured result.
    Succeeded,
    /// Terminal: holds the collapsed error message.
    Failed,
}

impl AnalysisPhase {
    /// Check if this phase allows transitioning to another phase.
    ///
    /// A new upload supersedes an in-flight attempt, so `Encoding` is
    /// reachable from every phase.
    pub fn can_transition_to(&self, target: AnalysisPhase) -> bool {
        use AnalysisPhase::*;

        matches!(
            (self, target),
            // StartUpload
            (Idle, Encoding) | (Succeeded, Encoding) | (Failed, Encoding) |
            (Encoding, Encoding) | (Analyzing, Encoding) |
            // EncodingComplete / EncodingFailed
            (Encoding, Analyzing) | (Encoding, Failed) |
            // AnalysisComplete / AnalysisFailed
            (Analyzing, Succeeded) | (Analyzing, Failed) |
            // Reset / Dismiss
            (Succeeded, Idle) | (Failed, Idle)
        )
    }

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Check if an attempt is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Encoding | Self::Analyzing)
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Encoding => "encoding",
            Self::Analyzing => "analyzing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Token identifying one Upload-Encode-Analyze attempt. Only the token
/// from the most recent `start_upload` may mutate the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptToken(u64);

/// The top-level mutable state of one user interaction.
///
/// Invariant: at most one of `data`/`error` is non-null, and an in-flight
/// phase implies both are null.
#[derive(Debug)]
pub struct AnalysisSession {
    phase: AnalysisPhase,
    data: Option<SongAnalysis>,
    error: Option<String>,
    preview: Option<PreviewHandle>,
    attempt: u64,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    /// Create a new idle session.
    pub fn new() -> Self {
        Self {
            phase: AnalysisPhase::Idle,
            data: None,
            error: None,
            preview: None,
            attempt: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Structured result, present only in `Succeeded`.
    pub fn data(&self) -> Option<&SongAnalysis> {
        self.data.as_ref()
    }

    /// Collapsed error message, present only in `Failed`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Preview resource for the current upload.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Begin a new attempt. Clears prior data/error, releases the
    /// superseded preview, and invalidates any in-flight attempt's token.
    pub fn start_upload(&mut self, preview: Option<PreviewHandle>) -> AttemptToken {
        if self.phase().is_in_flight() {
            tracing::debug!(attempt = self.attempt, "superseding in-flight attempt");
        }
        self.data = None;
        self.error = None;
        if let Some(mut old) = self.preview.take() {
            old.release();
        }
        self.preview = preview;
        self.phase = AnalysisPhase::Encoding;
        self.attempt += 1;
        AttemptToken(self.attempt)
    }

    /// Encoding finished; move to `Analyzing`. Returns false if the
    /// attempt was superseded and the transition was discarded.
    pub fn encoding_complete(&mut self, token: AttemptToken) -> bool {
        self.apply(token, AnalysisPhase::Encoding, AnalysisPhase::Analyzing, |_| {})
    }

    /// Encoding failed; terminal for this attempt.
    pub fn encoding_failed(&mut self, token: AttemptToken, message: impl Into<String>) -> bool {
        let message = message.into();
        self.apply(token, AnalysisPhase::Encoding, AnalysisPhase::Failed, |s| {
            s.error = Some(message);
        })
    }

    /// Analysis finished; terminal with data.
    pub fn analysis_complete(&mut self, token: AttemptToken, result: SongAnalysis) -> bool {
        self.apply(
            token,
            AnalysisPhase::Analyzing,
            AnalysisPhase::Succeeded,
            |s| {
                s.data = Some(result);
            },
        )
    }

    /// Analysis failed; terminal with the collapsed error message.
    pub fn analysis_failed(&mut self, token: AttemptToken, message: impl Into<String>) -> bool {
        let message = message.into();
        self.apply(token, AnalysisPhase::Analyzing, AnalysisPhase::Failed, |s| {
            s.error = Some(message);
        })
    }

    /// Return to `Idle` from a terminal phase, clearing data and error and
    /// releasing the preview resource.
    pub fn reset(&mut self) -> Result<(), String> {
        if !self.phase().is_terminal() {
            return Err(format!("Cannot reset from {}", self.phase()));
        }
        self.data = None;
        self.error = None;
        if let Some(mut preview) = self.preview.take() {
            preview.release();
        }
        self.phase = AnalysisPhase::Idle;
        self.attempt += 1;
        Ok(())
    }

    /// Clear the error from `Failed`, returning to an idle-equivalent
    /// state without a new upload. A no-op when already idle.
    pub fn dismiss(&mut self) -> Result<(), String> {
        match self.phase() {
            AnalysisPhase::Failed => {
                self.error = None;
                if let Some(mut preview) = self.preview.take() {
                    preview.release();
                }
                self.phase = AnalysisPhase::Idle;
                self.attempt += 1;
                Ok(())
            }
            AnalysisPhase::Idle => Ok(()),
            phase => Err(format!("Cannot dismiss from {}", phase)),
        }
    }

    /// Invariant check: at most one of data/error, both null in flight.
    pub fn is_consistent(&self) -> bool {
        let both = self.data.is_some() && self.error.is_some();
        let in_flight_dirty = self.phase().is_in_flight() && (self.data.is_some() || self.error.is_some());
        !both && !in_flight_dirty
    }

    fn apply(
        &mut self,
        token: AttemptToken,
        expected: AnalysisPhase,
        target: AnalysisPhase,
        mutate: impl FnOnce(&mut Self),
    ) -> bool {
        if token.0 != self.attempt {
            tracing::debug!(
                stale = token.0,
                current = self.attempt,
                "discarding outcome of superseded attempt"
            );
            return false;
        }
        let phase = self.phase();
        if phase != expected || !phase.can_transition_to(target) {
            tracing::debug!(%phase, %target, "discarding out-of-order transition");
            return false;
        }
        mutate(self);
        self.phase = target;
        debug_assert!(self.is_consistent());
        true
    }
}

/// Outcome of one driven attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The attempt ran to completion and its result is in the session.
    Succeeded(SongAnalysis),
    /// A newer upload superseded this attempt; its outcome was discarded.
    Superseded,
}

/// Drives the Upload-Encode-Analyze flow over a shared session.
///
/// The session lock is never held across a suspension point: the file
/// read, the base64 encode, and the network round trip all run unlocked,
/// and their outcomes re-enter the session guarded by the attempt token.
pub struct Pipeline {
    analyzer: Arc<dyn SongAnalyzer>,
    session: Arc<Mutex<AnalysisSession>>,
}

impl Pipeline {
    /// Create a pipeline around a fresh session.
    pub fn new(analyzer: Arc<dyn SongAnalyzer>) -> Self {
        Self {
            analyzer,
            session: Arc::new(Mutex::new(AnalysisSession::new())),
        }
    }

    /// Shared handle to the session.
    pub fn session(&self) -> Arc<Mutex<AnalysisSession>> {
        Arc::clone(&self.session)
    }

    /// Run one attempt end to end.
    pub async fn run(&self, file: MediaFile) -> Result<AttemptOutcome, Error> {
        let info = file.info();
        tracing::info!(mime = %info.mime_type, kind = %info.kind, size = info.size, "starting analysis attempt");
        if file.exceeds_advisory_limit() {
            tracing::warn!(size = info.size, "file exceeds the 100MB advisory limit");
        }

        let preview = match PreviewHandle::create(file.bytes(), file.mime_type()).await {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("preview allocation failed: {}", e);
                None
            }
        };

        let token = self.session.lock().await.start_upload(preview);

        let encoded = tokio::task::spawn_blocking(move || EncodedPayload::encode(file)).await;
        let payload = match encoded {
            Ok(payload) => payload,
            Err(e) => {
                let err = MediaError::EncodingFailed {
                    reason: e.to_string(),
                };
                tracing::warn!("attempt failed while encoding: {}", err);
                self.session.lock().await.encoding_failed(token, FAILURE_MESSAGE);
                return Err(err.into());
            }
        };

        if !self.session.lock().await.encoding_complete(token) {
            return Ok(AttemptOutcome::Superseded);
        }

        match self.analyzer.analyze(payload).await {
            Ok(result) => {
                let mut session = self.session.lock().await;
                if session.analysis_complete(token, result.clone()) {
                    tracing::info!(title = %result.title, artist = %result.artist, "analysis succeeded");
                    Ok(AttemptOutcome::Succeeded(result))
                } else {
                    Ok(AttemptOutcome::Superseded)
                }
            }
            Err(e) => {
                tracing::warn!("attempt failed during analysis: {}", e);
                let applied = self
                    .session
                    .lock()
                    .await
                    .analysis_failed(token, FAILURE_MESSAGE);
                if applied {
                    Err(e.into())
                } else {
                    Ok(AttemptOutcome::Superseded)
                }
            }
        }
    }
}
