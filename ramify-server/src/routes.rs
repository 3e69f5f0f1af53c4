//! Route table and request handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ramify_core::{
    BusinessRequest, BusinessResponse, ErrorBody, MindmapRequest, MindmapResponse, RelayError,
    build_mindmap_prompt,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{BUILD_TIME, GIT_HASH, VERSION};

/// Create the relay router: one explicit route table for every surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-mindmap", post(generate_mindmap))
        .route("/api/generate-business", post(generate_business))
        .route("/health", get(health_check))
        .route("/api/version", get(version))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// `POST /api/generate-mindmap`: build the prompt, relay it to the provider
/// and hand the outline back verbatim. Persistence, when configured, is
/// best-effort post-processing and never fails the response.
async fn generate_mindmap(
    State(state): State<AppState>,
    payload: Result<Json<MindmapRequest>, JsonRejection>,
) -> Result<Json<MindmapResponse>, ApiError> {
    let Json(request) = payload.map_err(reject)?;

    let topic = request
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RelayError::Validation("topic is required".to_string()))?
        .to_string();

    info!(topic = %topic, "generating mind map");

    let prompt = build_mindmap_prompt(&topic);
    let outline = state.generator.generate(&prompt).await?;

    if let Some(store) = &state.store {
        match store.persist_outline(&topic, &outline).await {
            Ok(artifact) => {
                info!(path = %artifact.local_path.display(), "outline persisted");
            }
            Err(e) => warn!("failed to persist outline: {e}"),
        }
    }

    Ok(Json(MindmapResponse::new(outline, topic)))
}

/// `POST /api/generate-business`: forward the query to the external agent
/// and reshape its payload into the text envelope.
async fn generate_business(
    State(state): State<AppState>,
    payload: Result<Json<BusinessRequest>, JsonRejection>,
) -> Result<Json<BusinessResponse>, ApiError> {
    let Json(request) = payload.map_err(reject)?;

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| RelayError::Validation("query is required".to_string()))?
        .to_string();

    info!(query = %query, "forwarding business query");

    let result = state.agent.invoke(&query).await?;

    Ok(Json(BusinessResponse::text(result)))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({
        "version": VERSION,
        "git_hash": GIT_HASH,
        "build_time": BUILD_TIME
    }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("not found", format!("no route for {uri}"))),
    )
}

async fn method_not_allowed(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new(
            "method not allowed",
            format!("unsupported method for {uri}"),
        )),
    )
}

/// Map a body-parse rejection onto the validation envelope, so malformed
/// JSON gets the same `success:false` shape as every other failure.
fn reject(rejection: JsonRejection) -> ApiError {
    ApiError(RelayError::Validation(rejection.body_text()))
}
