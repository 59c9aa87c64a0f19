use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::routes::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests without a valid `X-API-Key` header.
///
/// Missing key gives 401, wrong key gives 403, both with a French `detail`
/// body matching the other services.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "API Key manquante" })),
        )
            .into_response(),
        Some(key) if key != state.api_key => (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "API Key invalide" })),
        )
            .into_response(),
        Some(_) => next.run(req).await,
    }
}
