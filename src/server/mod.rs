//! HTTP surface for the upload-and-analyze flow.
//!
//! A single axum server hosting the upload page and the JSON API. The
//! server owns one [`Pipeline`]; each upload request drives one attempt
//! through it and concurrent uploads follow the supersede-and-discard
//! policy of the session.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::SongAnalysis;
use crate::error::{MediaError, ServerError};
use crate::media::{MAX_ADVISORY_BYTES, MediaFile};
use crate::session::{AnalysisPhase, AttemptOutcome, FAILURE_MESSAGE, Pipeline};

const INDEX_HTML: &str = include_str!("index.html");

/// Configuration for the analysis server.
pub struct ServerConfig {
    /// Address to bind the server to.
    pub addr: SocketAddr,
}

/// The HTTP server wrapping one analysis pipeline.
pub struct AnalysisServer {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AnalysisServer {
    /// Create a new server around the given pipeline.
    pub fn new(config: ServerConfig, pipeline: Arc<Pipeline>) -> Self {
        Self {
            config,
            pipeline,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind the listener and spawn the server task.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        let app = build_router(Arc::clone(&self.pipeline));

        let listener = tokio::net::TcpListener::bind(self.config.addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                addr: self.config.addr.to_string(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| ServerError::BindFailed {
            addr: self.config.addr.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!("Analysis server listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("Analysis server shutting down");
                })
                .await
            {
                tracing::error!("Analysis server error: {}", e);
            }
        });

        self.handle = Some(handle);
        Ok(local_addr)
    }

    /// Signal graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

/// Build the router with all routes and layers applied.
pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    // Uploads above the advisory limit are still accepted; leave headroom
    // over the advisory figure rather than enforcing it.
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/session", get(session_snapshot))
        .route("/api/reset", post(reset))
        .route("/api/dismiss", post(dismiss))
        .layer(DefaultBodyLimit::max(2 * MAX_ADVISORY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

/// Response envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Snapshot of the session for the UI poll.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub phase: AnalysisPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SongAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("ok".to_string()))
}

async fn analyze(
    State(pipeline): State<Arc<Pipeline>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let mime = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some(MediaFile::from_bytes(
                            bytes.to_vec(),
                            mime.as_deref(),
                            filename.as_deref(),
                        ));
                        break;
                    }
                    Err(e) => {
                        let err = ServerError::InvalidUpload(e.to_string());
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ApiResponse::<SongAnalysis>::err(err.to_string())),
                        );
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                let err = ServerError::InvalidUpload(e.to_string());
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<SongAnalysis>::err(err.to_string())),
                );
            }
        }
    }

    // No file selected: no state change, nothing to analyze.
    let Some(file) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<SongAnalysis>::err(
                MediaError::InvalidInput.to_string(),
            )),
        );
    };

    match pipeline.run(file).await {
        Ok(AttemptOutcome::Succeeded(analysis)) => {
            (StatusCode::OK, Json(ApiResponse::ok(analysis)))
        }
        Ok(AttemptOutcome::Superseded) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<SongAnalysis>::err(
                "Superseded by a newer upload",
            )),
        ),
        Err(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<SongAnalysis>::err(FAILURE_MESSAGE)),
        ),
    }
}

async fn session_snapshot(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    let session = pipeline.session();
    let session = session.lock().await;
    Json(ApiResponse::ok(SessionSnapshot {
        phase: session.phase(),
        data: session.data().cloned(),
        error: session.error().map(str::to_string),
    }))
}

async fn reset(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    let session = pipeline.session();
    let mut session = session.lock().await;
    match session.reset() {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok("reset".to_string()))),
        Err(e) => (StatusCode::CONFLICT, Json(ApiResponse::<String>::err(e))),
    }
}

async fn dismiss(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    let session = pipeline.session();
    let mut session = session.lock().await;
    match session.dismiss() {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok("dismissed".to_string())),
        ),
        Err(e) => (StatusCode::CONFLICT, Json(ApiResponse::<String>::err(e))),
    }
}
