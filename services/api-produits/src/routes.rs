use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use event_bus::SEUIL_STOCK_BAS;

use crate::error::ApiError;
use crate::health::health;
use crate::models::{Produit, ProduitCreate, ProduitUpdate};
use crate::publisher::EventPublisher;
use crate::store::ProduitStore;

pub struct AppState {
    pub store: Arc<dyn ProduitStore>,
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
    let products = Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/{produit_id}",
            get(get_product).put(update_product).delete(delete_product),
        );

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/products", products)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Bienvenue sur l'API Produits de PayeTonKawa" }))
}

/// Fires the low-stock alert next to a created/updated event when the
/// written row landed under the threshold.
async fn alert_if_stock_low(state: &AppState, produit: &Produit) {
    if produit.stock < SEUIL_STOCK_BAS {
        state.publisher.produit_stock_low(produit).await;
    }
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProduitCreate>,
) -> Result<(StatusCode, Json<Produit>), ApiError> {
    let produit = state.store.create(&payload).await?;
    state.publisher.produit_created(&produit).await;
    alert_if_stock_low(&state, &produit).await;
    Ok((StatusCode::CREATED, Json(produit)))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Produit>>, ApiError> {
    let produits = state.store.list(pagination.skip, pagination.limit).await?;
    Ok(Json(produits))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(produit_id): Path<i32>,
) -> Result<Json<Produit>, ApiError> {
    match state.store.get(produit_id).await? {
        Some(produit) => Ok(Json(produit)),
        None => Err(ApiError::NotFound("Produit non trouve".to_string())),
    }
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(produit_id): Path<i32>,
    Json(payload): Json<ProduitUpdate>,
) -> Result<Json<Produit>, ApiError> {
    match state.store.update(produit_id, &payload).await? {
        Some(produit) => {
            state.publisher.produit_updated(&produit).await;
            alert_if_stock_low(&state, &produit).await;
            Ok(Json(produit))
        }
        None => Err(ApiError::NotFound("Produit non trouve".to_string())),
    }
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(produit_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(produit_id).await? {
        state.publisher.produit_deleted(produit_id).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Produit non trouve".to_string()))
    }
}
