//! Product persistence behind an explicit store handle.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Produit, ProduitCreate, ProduitUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProduitStore: Send + Sync {
    async fn create(&self, produit: &ProduitCreate) -> Result<Produit, StoreError>;

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Produit>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Produit>, StoreError>;

    /// Partial update; `None` fields keep their stored value. Returns the
    /// updated product or `None` when it does not exist.
    async fn update(&self, id: i32, update: &ProduitUpdate) -> Result<Option<Produit>, StoreError>;

    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

const SELECT_PRODUIT: &str = "SELECT id, nom, description, prix, stock, origine, poids_kg, \
                              actif, date_creation, date_modification FROM produits";

/// Postgres-backed store used by the running service.
#[derive(Clone)]
pub struct PgProduitStore {
    pool: PgPool,
}

impl PgProduitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProduitStore for PgProduitStore {
    async fn create(&self, produit: &ProduitCreate) -> Result<Produit, StoreError> {
        let created = sqlx::query_as(
            "INSERT INTO produits (nom, description, prix, stock, origine, poids_kg)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, nom, description, prix, stock, origine, poids_kg, actif,
                       date_creation, date_modification",
        )
        .bind(&produit.nom)
        .bind(&produit.description)
        .bind(produit.prix)
        .bind(produit.stock)
        .bind(&produit.origine)
        .bind(produit.poids_kg)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Produit>, StoreError> {
        let produits = sqlx::query_as(&format!("{SELECT_PRODUIT} ORDER BY id OFFSET $1 LIMIT $2"))
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(produits)
    }

    async fn get(&self, id: i32) -> Result<Option<Produit>, StoreError> {
        let produit = sqlx::query_as(&format!("{SELECT_PRODUIT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(produit)
    }

    async fn update(&self, id: i32, update: &ProduitUpdate) -> Result<Option<Produit>, StoreError> {
        let updated = sqlx::query_as(
            "UPDATE produits SET
                 nom = COALESCE($2, nom),
                 description = COALESCE($3, description),
                 prix = COALESCE($4, prix),
                 stock = COALESCE($5, stock),
                 origine = COALESCE($6, origine),
                 poids_kg = COALESCE($7, poids_kg),
                 actif = COALESCE($8, actif),
                 date_modification = now()
             WHERE id = $1
             RETURNING id, nom, description, prix, stock, origine, poids_kg, actif,
                       date_creation, date_modification",
        )
        .bind(id)
        .bind(&update.nom)
        .bind(&update.description)
        .bind(update.prix)
        .bind(update.stock)
        .bind(&update.origine)
        .bind(update.poids_kg)
        .bind(update.actif)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM produits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
