use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::health::health;
use crate::models::{ClientCreate, ClientResponse, ClientUpdate};
use crate::publisher::EventPublisher;
use crate::store::ClientStore;
use crate::validation::{validate_create, validate_update};

pub struct AppState {
    pub store: Arc<dyn ClientStore>,
    pub publisher: EventPublisher,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub fn app(state: Arc<AppState>) -> Router {
    let customers = Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route(
            "/{client_id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        );

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/customers", customers)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Bienvenue sur l'API Clients de PayeTonKawa" }))
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClientCreate>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    validate_create(&payload)?;

    let client = state.store.create(&payload).await?;
    state.publisher.client_created(&client).await;
    Ok((StatusCode::CREATED, Json(client.into())))
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.store.list(pagination.skip, pagination.limit).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i32>,
) -> Result<Json<ClientResponse>, ApiError> {
    match state.store.get(client_id).await? {
        Some(client) => Ok(Json(client.into())),
        None => Err(ApiError::NotFound("Client non trouvé".to_string())),
    }
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i32>,
    Json(payload): Json<ClientUpdate>,
) -> Result<Json<ClientResponse>, ApiError> {
    validate_update(&payload)?;

    match state.store.update(client_id, &payload).await? {
        Some(client) => {
            state.publisher.client_updated(&client).await;
            Ok(Json(client.into()))
        }
        None => Err(ApiError::NotFound("Client non trouvé".to_string())),
    }
}

async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(client_id).await? {
        state.publisher.client_deleted(client_id).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Client non trouvé".to_string()))
    }
}
