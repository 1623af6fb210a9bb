pub mod queue;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::queue::QueueService;

use crate::openapi::ApiDoc;

/// Shared handler state: the process-wide queue.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn QueueService>,
}

impl AppState {
    pub fn new(queue: Arc<dyn QueueService>) -> Self {
        Self { queue }
    }
}

#[utoipa::path(get, path = "/", tag = "System", responses((status = 200, description = "Service is up", body = crate::openapi::HealthDoc)))]
pub async fn health() -> Json<Health> {
    Json(Health::healthy())
}

/// Build the full application router: health, queue API and Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api: Router<AppState> = Router::new()
        .route("/api/queue/enqueue", post(queue::enqueue))
        .route("/api/queue/dequeue", post(queue::dequeue))
        .route("/api/queue/status", get(queue::status));

    Router::new()
        .route("/", get(health))
        .merge(api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
