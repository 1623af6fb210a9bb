use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use service::queue::{EnqueueOutcome, QueueItem, QueueStatus};

use super::AppState;
use crate::errors::JsonApiError;

const PAYLOAD_REQUIRED: &str = "Payload is required.";

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DequeueResponse {
    pub item: QueueItem,
}

#[utoipa::path(
    post,
    path = "/api/queue/enqueue",
    tag = "Queue",
    request_body = crate::openapi::EnqueueRequestDoc,
    responses(
        (status = 201, description = "Item enqueued", body = crate::openapi::EnqueueResponseDoc,
            headers(("Location" = String, description = "URI of the created item"))),
        (status = 400, description = "Payload missing or blank", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn enqueue(
    State(state): State<AppState>,
    body: Result<Json<EnqueueRequest>, JsonRejection>,
) -> Result<Response, JsonApiError> {
    let payload = match body {
        Ok(Json(EnqueueRequest { payload: Some(p) })) if !p.trim().is_empty() => p,
        Ok(_) => return Err(JsonApiError::bad_request(PAYLOAD_REQUIRED)),
        Err(rejection) => {
            debug!(error = %rejection, "rejected enqueue body");
            return Err(JsonApiError::bad_request(PAYLOAD_REQUIRED));
        }
    };

    let outcome: EnqueueOutcome = state.queue.enqueue(payload).await?;
    info!(id = %outcome.item.id, position = outcome.position, "enqueued");
    let location = format!("/api/queue/items/{}", outcome.item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(outcome)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/queue/dequeue",
    tag = "Queue",
    responses(
        (status = 200, description = "Head of the queue", body = crate::openapi::DequeueResponseDoc),
        (status = 204, description = "Queue is empty")
    )
)]
pub async fn dequeue(State(state): State<AppState>) -> Response {
    match state.queue.dequeue().await {
        Some(item) => {
            info!(id = %item.id, "dequeued");
            Json(DequeueResponse { item }).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/queue/status",
    tag = "Queue",
    responses((status = 200, description = "Current queue size", body = crate::openapi::QueueStatusDoc))
)]
pub async fn status(State(state): State<AppState>) -> Json<QueueStatus> {
    Json(state.queue.status().await)
}
