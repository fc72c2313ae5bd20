//! HTTP API: ask, multipart upload, delete, plus root and health checks.
//! Any origin may call it (permissive CORS).
//!
//! Caller mistakes map to 400, unknown resources to 404, and failures of the
//! model server or vector index to 502 with the failing service named.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use kbase_core::error::Error;
use kbase_hybrid::upload::{decode_upload, validate_upload};
use kbase_hybrid::Answer;

use crate::app::App;

pub const NO_ANSWER_MESSAGE: &str = "Sorry, no relevant information was found to answer your question.";

/// Multipart form field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of `upload.max_bytes`.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub source_chunks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub document_id: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub document_id: String,
}

/// Error body: `{"detail": "..."}`.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.0.to_string() }))).into_response()
    }
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "kbase",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn handle_ask(State(app): State<Arc<App>>, Json(body): Json<AskRequest>) -> Result<Json<AskResponse>, ApiError> {
    let answer = app.answers.answer(&body.question).await?;
    let source_chunks = answer.source_texts();
    let answer = match answer {
        Answer::Generated { text, .. } => text,
        Answer::NoRelevantDocuments => NO_ANSWER_MESSAGE.to_string(),
    };
    Ok(Json(AskResponse { answer, source_chunks }))
}

async fn read_upload_field(multipart: &mut Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("field '{UPLOAD_FIELD}' has no filename")))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("reading '{filename}': {e}")))?;
        return Ok((filename, bytes));
    }
    Err(Error::InvalidInput(format!("multipart field '{UPLOAD_FIELD}' is missing")))
}

async fn handle_upload(State(app): State<Arc<App>>, mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let (filename, body) = read_upload_field(&mut multipart).await?;
    validate_upload(&filename, body.len(), &app.settings.upload)?;
    let text = decode_upload(&body);
    let report = app.ingestor.ingest_text(&text).await?;
    tracing::info!(%filename, doc_id = %report.doc_id, chunks = report.chunks, "upload processed");
    Ok(Json(UploadResponse {
        message: "document uploaded and processed".to_string(),
        document_id: report.doc_id,
        chunks: report.chunks,
    }))
}

async fn handle_delete(State(app): State<Arc<App>>, Path(doc_id): Path<String>) -> Result<Json<DeleteResponse>, ApiError> {
    let doc_id = doc_id.trim().to_string();
    if doc_id.is_empty() {
        return Err(Error::InvalidInput("document id must not be empty".into()).into());
    }
    app.ingestor.delete_document(&doc_id).await?;
    Ok(Json(DeleteResponse { message: "document deleted".to_string(), document_id: doc_id }))
}

pub fn router(app: Arc<App>) -> Router {
    let body_limit = app.settings.upload.max_bytes.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/v1/ask", post(handle_ask))
        .route("/api/v1/upload", post(handle_upload))
        .route("/api/v1/documents/{doc_id}", delete(handle_delete))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(app)
}

/// Serve until Ctrl+C; in-flight requests complete before exit.
pub async fn run(app: Arc<App>, bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {} (Ctrl+C to stop)", bind_addr);
    axum::serve(listener, router(app)).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C, shutting down");
    }
}
