use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::require_api_key;
use crate::error::ApiError;
use crate::health::health;
use crate::models::{Commande, CommandeCreate, CommandeUpdate};
use crate::publisher::EventPublisher;
use crate::store::CommandeStore;

pub struct AppState {
    pub store: Arc<dyn CommandeStore>,
    pub publisher: EventPublisher,
    pub api_key: String,
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

/// Full application router. Everything under `/orders` requires the API key;
/// the root banner and health check stay open.
pub fn app(state: Arc<AppState>) -> Router {
    let orders = Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/client/{client_id}", get(list_orders_by_client))
        .route(
            "/{commande_id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/orders", orders)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Bienvenue sur l'API Commandes de PayeTonKawa" }))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommandeCreate>,
) -> Result<(StatusCode, Json<Commande>), ApiError> {
    let commande = state.store.create(&payload).await?;
    state.publisher.commande_created(&commande).await;
    Ok((StatusCode::CREATED, Json(commande)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Commande>>, ApiError> {
    let commandes = state.store.list(pagination.skip, pagination.limit).await?;
    Ok(Json(commandes))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(commande_id): Path<i32>,
) -> Result<Json<Commande>, ApiError> {
    match state.store.get(commande_id).await? {
        Some(commande) => Ok(Json(commande)),
        None => Err(ApiError::NotFound("Commande non trouvee".to_string())),
    }
}

async fn list_orders_by_client(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i32>,
) -> Result<Json<Vec<Commande>>, ApiError> {
    let commandes = state.store.find_by_client(client_id).await?;
    Ok(Json(commandes))
}

/// Only the status can change after creation; a body without `statut`
/// leaves the order as is but still reports it back.
async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(commande_id): Path<i32>,
    Json(payload): Json<CommandeUpdate>,
) -> Result<Json<Commande>, ApiError> {
    let updated = match payload.statut {
        Some(statut) => state.store.update_statut(commande_id, &statut).await?,
        None => state.store.get(commande_id).await?,
    };

    match updated {
        Some(commande) => {
            state.publisher.commande_updated(&commande).await;
            Ok(Json(commande))
        }
        None => Err(ApiError::NotFound("Commande non trouvee".to_string())),
    }
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(commande_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(commande_id).await? {
        state.publisher.commande_deleted(commande_id).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Commande non trouvee".to_string()))
    }
}
