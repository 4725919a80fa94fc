//! Router construction and shared application state.
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::docs::ApiDoc;
use crate::api::handlers;
use crate::eachlabs::client::EachlabsClient;
use crate::imgbb::client::ImgbbClient;

/// State shared by all handlers: the two upstream clients plus the poll
/// settings. Nothing here is mutable across requests.
pub struct AppState {
    pub imgbb: ImgbbClient,
    pub eachlabs: EachlabsClient,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/change-cloth", post(handlers::change_cloth))
        .route("/status/:execution_id", get(handlers::execution_status))
        .route("/executions", get(handlers::list_executions))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        // Two photos per request; the default 2 MB body limit is too small.
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
