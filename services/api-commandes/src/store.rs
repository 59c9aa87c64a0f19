//! Order persistence behind an explicit store handle.
//!
//! Lookups report presence with `Option`; the HTTP layer turns `None` into
//! 404 and the reconciler treats an empty result set as success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{statut, Commande, CommandeCreate, LigneCommande};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Everything the routes and the reconciler need from order storage.
#[async_trait]
pub trait CommandeStore: Send + Sync {
    /// Insert the order and its lines; the total is computed from the lines
    /// and the status starts at `pending`.
    async fn create(&self, commande: &CommandeCreate) -> Result<Commande, StoreError>;

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Commande>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Commande>, StoreError>;

    /// All orders of one customer, oldest first.
    async fn find_by_client(&self, client_id: i32) -> Result<Vec<Commande>, StoreError>;

    /// Absolute status assignment; returns the updated order or `None` when
    /// it no longer exists.
    async fn update_statut(&self, id: i32, statut: &str) -> Result<Option<Commande>, StoreError>;

    /// Returns whether an order was deleted; lines cascade.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

/// Postgres-backed store used by the running service.
#[derive(Clone)]
pub struct PgCommandeStore {
    pool: PgPool,
}

impl PgCommandeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach their lines to a batch of order rows, preserving row order.
    async fn with_lignes(&self, rows: Vec<CommandeRow>) -> Result<Vec<Commande>, StoreError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let lignes: Vec<LigneCommande> = sqlx::query_as(
            "SELECT id, commande_id, produit_id, quantite, prix_unitaire
             FROM lignes_commande WHERE commande_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let commande_lignes = lignes
                    .iter()
                    .filter(|l| l.commande_id == row.id)
                    .cloned()
                    .collect();
                row.into_commande(commande_lignes)
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct CommandeRow {
    id: i32,
    client_id: i32,
    statut: String,
    total: f64,
    date_commande: DateTime<Utc>,
    date_modification: DateTime<Utc>,
}

impl CommandeRow {
    fn into_commande(self, lignes: Vec<LigneCommande>) -> Commande {
        Commande {
            id: self.id,
            client_id: self.client_id,
            statut: self.statut,
            total: self.total,
            date_commande: self.date_commande,
            date_modification: self.date_modification,
            lignes,
        }
    }
}

const SELECT_COMMANDE: &str =
    "SELECT id, client_id, statut, total, date_commande, date_modification FROM commandes";

#[async_trait]
impl CommandeStore for PgCommandeStore {
    async fn create(&self, commande: &CommandeCreate) -> Result<Commande, StoreError> {
        let total = commande.total();
        let mut tx = self.pool.begin().await?;

        let row: CommandeRow = sqlx::query_as(
            "INSERT INTO commandes (client_id, statut, total) VALUES ($1, $2, $3)
             RETURNING id, client_id, statut, total, date_commande, date_modification",
        )
        .bind(commande.client_id)
        .bind(statut::PENDING)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut lignes = Vec::with_capacity(commande.lignes.len());
        for ligne in &commande.lignes {
            let (ligne_id,): (i32,) = sqlx::query_as(
                "INSERT INTO lignes_commande (commande_id, produit_id, quantite, prix_unitaire)
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(row.id)
            .bind(ligne.produit_id)
            .bind(ligne.quantite)
            .bind(ligne.prix_unitaire)
            .fetch_one(&mut *tx)
            .await?;

            lignes.push(LigneCommande {
                id: ligne_id,
                commande_id: row.id,
                produit_id: ligne.produit_id,
                quantite: ligne.quantite,
                prix_unitaire: ligne.prix_unitaire,
            });
        }

        tx.commit().await?;
        Ok(row.into_commande(lignes))
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Commande>, StoreError> {
        let rows: Vec<CommandeRow> =
            sqlx::query_as(&format!("{SELECT_COMMANDE} ORDER BY id OFFSET $1 LIMIT $2"))
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        self.with_lignes(rows).await
    }

    async fn get(&self, id: i32) -> Result<Option<Commande>, StoreError> {
        let row: Option<CommandeRow> =
            sqlx::query_as(&format!("{SELECT_COMMANDE} WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(self.with_lignes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_client(&self, client_id: i32) -> Result<Vec<Commande>, StoreError> {
        let rows: Vec<CommandeRow> =
            sqlx::query_as(&format!("{SELECT_COMMANDE} WHERE client_id = $1 ORDER BY id"))
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?;
        self.with_lignes(rows).await
    }

    async fn update_statut(&self, id: i32, statut: &str) -> Result<Option<Commande>, StoreError> {
        let row: Option<CommandeRow> = sqlx::query_as(
            "UPDATE commandes SET statut = $2, date_modification = now() WHERE id = $1
             RETURNING id, client_id, statut, total, date_commande, date_modification",
        )
        .bind(id)
        .bind(statut)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_lignes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM commandes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
