use crate::config::Config;
use crate::db_storage::ReportStorage;
use crate::errors::AppError;
use crate::models::{ReportListResponse, ReportResponse, UploadResponse};
use crate::normalizer::ReportNormalizer;
use crate::upload::read_upload;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Document reader and normalizer used for every upload.
    pub normalizer: ReportNormalizer,
}

impl AppState {
    fn storage(&self) -> ReportStorage {
        ReportStorage::new(self.db.clone(), self.config.store_raw_xml)
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "credit-report-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/upload-xml
///
/// Accepts a multipart upload with an XML credit report in the `file` field,
/// normalizes it and stores the result.
///
/// # Returns
///
/// * `201 Created` with the new id and the normalized record.
/// * `400` for a missing file, a non-XML file name or unparsable content.
/// * `413` when the file exceeds `MAX_FILE_SIZE`.
pub async fn upload_xml(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let upload = read_upload(multipart, state.config.max_file_size).await?;
    tracing::info!(
        "POST /upload-xml - file: {}, {} bytes",
        upload.file_name,
        upload.text.len()
    );

    // Parsing is CPU-bound; keep it off the async workers.
    let normalizer = state.normalizer.clone();
    let text = upload.text;
    let (report, text) = tokio::task::spawn_blocking(move || {
        let report = normalizer.normalize(&text);
        (report, text)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Normalization task failed: {}", e)))?;
    let report = report?;

    let id = state
        .storage()
        .store_report(&upload.file_name, &text, &report)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File processed and data saved.".to_string(),
            id,
            data: report,
        }),
    ))
}

/// GET /api
///
/// Lists stored reports with only their subject names.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReportListResponse>, AppError> {
    let reports = state.storage().list_reports().await?;
    tracing::debug!("GET /api - {} report(s)", reports.len());

    Ok(Json(ReportListResponse {
        count: reports.len(),
        reports,
    }))
}

/// GET /api/:id
///
/// Retrieves one stored report by id. The raw XML is never returned.
pub async fn get_report_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    tracing::info!("GET /api/{}", id);

    let report = state
        .storage()
        .fetch_report(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    Ok(Json(ReportResponse { data: report }))
}
