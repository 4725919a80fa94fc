//! Request/response bodies for the HTTP API.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::eachlabs::client::ExecutionStatus;

/// Successful cloth-change response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClothChangeResponse {
    /// Public URL of the generated image.
    #[schema(example = "https://example.com/out.jpg")]
    pub result_url: String,
}

/// Single status probe for an execution.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExecutionStatusResponse {
    pub execution_id: String,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Multipart form accepted by `POST /change-cloth`. Schema-only: the handler
/// reads the fields through the multipart extractor.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ChangeClothForm {
    /// Photo of the person.
    #[schema(value_type = String, format = Binary)]
    pub person: Vec<u8>,
    /// Photo of the clothing item.
    #[schema(value_type = String, format = Binary)]
    pub cloth: Vec<u8>,
    /// Optional clothing type hint forwarded to the generation flow.
    pub clothing_type: Option<String>,
}
