//! Axum request handlers for the HTTP API.
use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::api::schemas::{ChangeClothForm, ClothChangeResponse, ExecutionStatusResponse};
use crate::error::{AppError, AppResult, ErrorBody};

pub async fn root() -> &'static str {
    "ClothAI API Relay"
}

/// Swap the clothing in the person image with the uploaded cloth image.
///
/// Hosts both uploads, triggers the generation flow, and polls the execution
/// until it finishes or the poll budget runs out.
#[utoipa::path(
    post,
    path = "/change-cloth",
    tag = "clothai",
    request_body(content = ChangeClothForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cloth change succeeded", body = ClothChangeResponse),
        (status = 400, description = "Missing or malformed upload", body = ErrorBody),
        (status = 502, description = "Image host or generation flow failed", body = ErrorBody),
        (status = 504, description = "Generation did not reach a terminal state in time", body = ErrorBody),
    )
)]
pub async fn change_cloth(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<ClothChangeResponse>> {
    let request_id = Uuid::new_v4();
    tracing::info!("[{}] New cloth change request received", request_id);

    let upload = read_upload(multipart).await?;

    tracing::info!("[{}] Uploading person image ({} bytes)", request_id, upload.person.len());
    let person_url = state.imgbb.upload_image(&upload.person).await?;

    tracing::info!("[{}] Uploading cloth image ({} bytes)", request_id, upload.cloth.len());
    let cloth_url = state.imgbb.upload_image(&upload.cloth).await?;

    tracing::info!("[{}] Processing cloth change", request_id);
    let trigger = state.eachlabs
        .trigger_cloth_change(&person_url, &cloth_url, upload.clothing_type.as_deref())
        .await?;
    let execution_id = trigger.id()
        .ok_or_else(|| AppError::Upstream("Trigger response missing execution id".to_string()))?
        .to_string();

    tracing::info!("[{}] Execution {} triggered, polling for completion", request_id, execution_id);
    let execution = state.eachlabs
        .wait_for_execution(&execution_id, state.poll_interval, state.poll_max_attempts)
        .await?;

    let result_url = execution.result_url.ok_or_else(|| {
        AppError::Upstream(format!("Execution {} succeeded without a result URL", execution_id))
    })?;

    tracing::info!("[{}] Cloth change complete: {}", request_id, result_url);
    Ok(Json(ClothChangeResponse { result_url }))
}

/// Check the status of a single execution without waiting on it.
#[utoipa::path(
    get,
    path = "/status/{execution_id}",
    tag = "clothai",
    params(("execution_id" = String, Path, description = "Execution id returned by the trigger")),
    responses(
        (status = 200, description = "Current execution status", body = ExecutionStatusResponse),
        (status = 502, description = "Generation flow unreachable or rejected the probe", body = ErrorBody),
    )
)]
pub async fn execution_status(
    State(state): State<Arc<AppState>>,
    Path(execution_id): Path<String>,
) -> AppResult<Json<ExecutionStatusResponse>> {
    tracing::info!("Status check requested for execution {}", execution_id);
    let execution = state.eachlabs.get_execution(&execution_id).await?;
    Ok(Json(ExecutionStatusResponse {
        execution_id,
        status: execution.status,
        result_url: execution.result_url,
        error: execution.error,
    }))
}

/// List all executions recorded for the flow, as raw upstream JSON.
#[utoipa::path(
    get,
    path = "/executions",
    tag = "clothai",
    responses(
        (status = 200, description = "Raw execution list from the generation flow"),
        (status = 502, description = "Generation flow unreachable", body = ErrorBody),
    )
)]
pub async fn list_executions(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.eachlabs.get_executions().await.map(Json)
}

struct Upload {
    person: Bytes,
    cloth: Bytes,
    clothing_type: Option<String>,
}

/// Collect the expected multipart fields, validating each as it streams in.
async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut person: Option<Bytes> = None;
    let mut cloth: Option<Bytes> = None;
    let mut clothing_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("person") => person = Some(read_image_field(field, "person").await?),
            Some("cloth") => cloth = Some(read_image_field(field, "cloth").await?),
            Some("clothing_type") => {
                let text = field.text().await
                    .map_err(|e| AppError::Validation(format!("Failed to read 'clothing_type' field: {}", e)))?;
                if !text.is_empty() {
                    clothing_type = Some(text);
                }
            }
            _ => {}
        }
    }

    let person = person
        .ok_or_else(|| AppError::Validation("Missing 'person' image field".to_string()))?;
    let cloth = cloth
        .ok_or_else(|| AppError::Validation("Missing 'cloth' image field".to_string()))?;

    Ok(Upload { person, cloth, clothing_type })
}

async fn read_image_field(field: Field<'_>, name: &str) -> AppResult<Bytes> {
    if let Some(content_type) = field.content_type() {
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!("'{}' file must be an image", name)));
        }
    }
    let bytes = field.bytes().await
        .map_err(|e| AppError::Validation(format!("Failed to read '{}' field: {}", name, e)))?;
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("'{}' image is empty", name)));
    }
    Ok(bytes)
}
