//! Request handlers.

use axum::{
    extract::{Multipart, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use switchboard_agents::{AskResponse, AuditRecord};
use switchboard_core::AppError;
use switchboard_knowledge::UploadReceipt;

use crate::error::ApiError;
use crate::state::AppState;

/// Form fields of `POST /ask/`.
#[derive(Debug, Clone, Deserialize)]
pub struct AskForm {
    pub query: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /upload_pdf/ - store a PDF and build its passage index.
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        tracing::info!(filename = %filename, "Upload received");

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;

        let receipt = state
            .orchestrator
            .library()
            .upload(&filename, &bytes)
            .await?;
        return Ok(Json(receipt));
    }

    Err(AppError::InvalidInput("Missing multipart field 'file'".to_string()).into())
}

/// POST /ask/ - route, retrieve and answer.
pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Json<AskResponse> {
    tracing::info!(query = %form.query, filename = ?form.filename, "Question received");
    let response = state
        .orchestrator
        .handle(&form.query, form.filename.as_deref())
        .await;
    Json(response)
}

/// GET /logs/ - every routing audit record.
pub async fn logs(State(state): State<AppState>) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let records = state.orchestrator.audit().read_all()?;
    Ok(Json(records))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
