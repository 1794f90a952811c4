//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{extract::State, http::StatusCode, Json};
use log::info;
use serde_json::Value;
use uuid::Uuid;

use super::dto::{
    CsvUploadRequest, CsvUploadResponse, DocumentsResponse, DocumentsUploadResponse,
    HealthResponse, VisualisationRequest, VisualisationResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::services::{clean_and_upload, generate_visualisation};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let documents = state.repository.count().await.ok();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
        documents,
    }))
}

// =============================================================================
// Uploads
// =============================================================================

/// POST /v1/uploads/csv
///
/// Run the wrangling pipeline over two CSV files readable by the server and
/// replace the store with the result.
pub async fn upload_csv(
    State(state): State<AppState>,
    Json(request): Json<CsvUploadRequest>,
) -> Result<(StatusCode, Json<CsvUploadResponse>), AppError> {
    let run_id = new_run_id();
    info!(
        "[{}] Cleaning {} and {}",
        run_id,
        request.antenna_path.display(),
        request.params_path.display()
    );

    let outcome = clean_and_upload(
        state.repository.as_ref(),
        &request.antenna_path,
        &request.params_path,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CsvUploadResponse {
            run_id,
            report: outcome.report,
            upload: outcome.upload,
        }),
    ))
}

/// POST /v1/uploads/documents
///
/// Replace the store with already-formatted documents.
pub async fn upload_documents(
    State(state): State<AppState>,
    Json(documents): Json<Vec<Value>>,
) -> Result<(StatusCode, Json<DocumentsUploadResponse>), AppError> {
    let run_id = new_run_id();
    info!("[{}] Uploading {} documents", run_id, documents.len());

    let upload = db_services::upload_documents(state.repository.as_ref(), documents).await?;
    Ok((StatusCode::CREATED, Json(DocumentsUploadResponse { run_id, upload })))
}

// =============================================================================
// Documents
// =============================================================================

/// GET /v1/documents
///
/// Every stored document, as stored.
pub async fn list_documents(State(state): State<AppState>) -> HandlerResult<DocumentsResponse> {
    let documents = state.repository.fetch_all().await?;
    let total = documents.len();
    Ok(Json(DocumentsResponse { documents, total }))
}

// =============================================================================
// Visualisations
// =============================================================================

/// POST /v1/visualisations
///
/// Generate a chart model from the stored records. An empty selection comes
/// back as a `no_visualisation` outcome with status 200.
pub async fn create_visualisation(
    State(state): State<AppState>,
    Json(request): Json<VisualisationRequest>,
) -> HandlerResult<VisualisationResponse> {
    request.validate()?;
    let run_id = new_run_id();
    let records = db_services::fetch_output_records(state.repository.as_ref()).await?;

    // CPU-bound analysis runs off the async workers
    let outcome = tokio::task::spawn_blocking(move || generate_visualisation(&records, &request))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    info!("[{}] Visualisation rendered: {}", run_id, outcome.is_rendered());
    Ok(Json(VisualisationResponse { run_id, outcome }))
}
