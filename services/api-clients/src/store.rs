//! Customer persistence behind an explicit store handle.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Client, ClientCreate, ClientUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create(&self, client: &ClientCreate) -> Result<Client, StoreError>;

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Client>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Client>, StoreError>;

    /// Partial update; `None` fields keep their stored value. Returns the
    /// updated customer or `None` when it does not exist.
    async fn update(&self, id: i32, update: &ClientUpdate) -> Result<Option<Client>, StoreError>;

    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

const SELECT_CLIENT: &str = "SELECT id, nom, prenom, email, telephone, adresse, actif, \
                             created_at, updated_at FROM clients";

/// Postgres-backed store used by the running service.
#[derive(Clone)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn create(&self, client: &ClientCreate) -> Result<Client, StoreError> {
        let created = sqlx::query_as(
            "INSERT INTO clients (nom, prenom, email, telephone, adresse)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, nom, prenom, email, telephone, adresse, actif, created_at, updated_at",
        )
        .bind(&client.nom)
        .bind(&client.prenom)
        .bind(&client.email)
        .bind(&client.telephone)
        .bind(&client.adresse)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Client>, StoreError> {
        let clients = sqlx::query_as(&format!("{SELECT_CLIENT} ORDER BY id OFFSET $1 LIMIT $2"))
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    async fn get(&self, id: i32) -> Result<Option<Client>, StoreError> {
        let client = sqlx::query_as(&format!("{SELECT_CLIENT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn update(&self, id: i32, update: &ClientUpdate) -> Result<Option<Client>, StoreError> {
        let updated = sqlx::query_as(
            "UPDATE clients SET
                 nom = COALESCE($2, nom),
                 prenom = COALESCE($3, prenom),
                 email = COALESCE($4, email),
                 telephone = COALESCE($5, telephone),
                 adresse = COALESCE($6, adresse),
                 actif = COALESCE($7, actif),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, nom, prenom, email, telephone, adresse, actif, created_at, updated_at",
        )
        .bind(id)
        .bind(&update.nom)
        .bind(&update.prenom)
        .bind(&update.email)
        .bind(&update.telephone)
        .bind(&update.adresse)
        .bind(update.actif)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
