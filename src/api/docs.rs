//! OpenAPI document served under `/docs` and `/redoc`.
use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::schemas::{ChangeClothForm, ClothChangeResponse, ExecutionStatusResponse};
use crate::eachlabs::client::ExecutionStatus;
use crate::error::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClothAI API",
        description = "API for cloth changing service"
    ),
    paths(
        handlers::change_cloth,
        handlers::execution_status,
        handlers::list_executions,
    ),
    components(schemas(
        ChangeClothForm,
        ClothChangeResponse,
        ExecutionStatusResponse,
        ExecutionStatus,
        ErrorBody,
    )),
    tags((name = "clothai", description = "Cloth swap relay endpoints"))
)]
pub struct ApiDoc;
