//! Workflow API handlers.
//!
//! Thin adapters between HTTP and [`rtw_core::Workflow`]: every decision
//! about stage legality and validation stays in the state machine.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use rtw_core::{
    Document, DocumentRole, ExtractionResult, FieldEdit, FieldSet, WorkflowError,
    WorkflowSnapshot,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct WorkflowErrorResponse {
    pub error: String,
    /// Stage after the failed operation.
    pub stage: String,
}

/// Response for a successful extraction
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub result: ExtractionResult,
    pub snapshot: WorkflowSnapshot,
}

/// Response for a field edit
#[derive(Debug, Serialize)]
pub struct EditFieldsResponse {
    pub fields: FieldSet,
}

type ApiError = (StatusCode, Json<WorkflowErrorResponse>);

fn status_for(error: &WorkflowError) -> StatusCode {
    match error {
        WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
        WorkflowError::InvalidStage { .. } => StatusCode::CONFLICT,
        e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        WorkflowError::Extraction(_) | WorkflowError::Run(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn error_response(state: &AppState, error: WorkflowError) -> ApiError {
    let stage = state.workflow().stage().await;
    (
        status_for(&error),
        Json(WorkflowErrorResponse {
            error: error.to_string(),
            stage: stage.name().to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Current workflow snapshot
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<WorkflowSnapshot> {
    Json(state.workflow().snapshot().await)
}

/// Extract fields from the two uploaded documents
///
/// Multipart parts: `share_file`, `dob_file`. Unknown parts are ignored and
/// unreadable ones count as absent.
pub async fn extract(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let mut share_code: Option<Document> = None;
    let mut dob: Option<Document> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed multipart upload");
                break;
            }
        };

        let role = match field.name() {
            Some(name) if name == DocumentRole::ShareCodeDoc.part_name() => {
                DocumentRole::ShareCodeDoc
            }
            Some(name) if name == DocumentRole::DobDoc.part_name() => DocumentRole::DobDoc,
            _ => continue,
        };

        let document = match read_document(role, field).await {
            Ok(document) => Some(document),
            Err(e) => {
                warn!(role = role.as_str(), error = %e, "Failed to read uploaded document");
                None
            }
        };
        match role {
            DocumentRole::ShareCodeDoc => share_code = document,
            DocumentRole::DobDoc => dob = document,
        }
    }

    match state.workflow().extract(share_code, dob).await {
        Ok(result) => Ok(Json(ExtractResponse {
            result,
            snapshot: state.workflow().snapshot().await,
        })),
        Err(e) => Err(error_response(&state, e).await),
    }
}

async fn read_document(
    role: DocumentRole,
    field: Field<'_>,
) -> Result<Document, axum::extract::multipart::MultipartError> {
    let filename = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;

    let document = Document::new(role, bytes.to_vec(), content_type.as_deref());
    Ok(match filename {
        Some(name) => document.with_filename(name),
        None => document,
    })
}

/// Apply operator edits to the field set
pub async fn edit_fields(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<EditFieldsResponse>, ApiError> {
    match state.workflow().edit_fields(edit).await {
        Ok(fields) => Ok(Json(EditFieldsResponse { fields })),
        Err(e) => Err(error_response(&state, e).await),
    }
}

/// Run the check and hand the certificate over as a download
pub async fn run(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let artifact = match state.workflow().run().await {
        Ok(artifact) => artifact,
        Err(e) => return Err(error_response(&state, e).await),
    };

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        artifact.filename.replace(['"', '\\'], "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(&artifact.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/pdf"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// End the session
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<WorkflowSnapshot>, ApiError> {
    match state.workflow().reset().await {
        Ok(()) => Ok(Json(state.workflow().snapshot().await)),
        Err(e) => Err(error_response(&state, e).await),
    }
}
