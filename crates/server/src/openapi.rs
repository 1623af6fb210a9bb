//! OpenAPI document served at `/api-docs/openapi.json` and rendered at `/docs`.
//!
//! The `*Doc` types mirror the wire shapes of the queue API; they exist only
//! for schema generation.

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthDoc { pub message: String }

#[derive(Serialize, ToSchema)]
pub struct EnqueueRequestDoc {
    /// Non-blank text to enqueue.
    pub payload: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemDoc {
    pub id: Uuid,
    pub payload: String,
    /// RFC 3339 UTC timestamp.
    pub enqueued_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct EnqueueResponseDoc {
    pub item: QueueItemDoc,
    /// Approximate 1-based position right after the append.
    pub position: usize,
}

#[derive(Serialize, ToSchema)]
pub struct DequeueResponseDoc {
    pub item: QueueItemDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusDoc { pub count: usize, pub is_empty: bool }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Queue Backend API",
        version = "v1",
        description = "A simple queue management system with REST endpoints to enqueue, dequeue, and check queue status. No authentication required."
    ),
    paths(
        crate::routes::health,
        crate::routes::queue::enqueue,
        crate::routes::queue::dequeue,
        crate::routes::queue::status,
    ),
    components(
        schemas(
            HealthDoc,
            EnqueueRequestDoc,
            QueueItemDoc,
            EnqueueResponseDoc,
            DequeueResponseDoc,
            QueueStatusDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "System"),
        (name = "Queue")
    )
)]
pub struct ApiDoc;
