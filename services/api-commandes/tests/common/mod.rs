//! Shared test doubles for the api-commandes integration tests.
//!
//! The suite swaps the Postgres store for an in-memory one so that the
//! router and the consumers can be exercised without any infrastructure.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use api_commandes::models::{statut, Commande, CommandeCreate, LigneCommande};
use api_commandes::store::{CommandeStore, StoreError};

#[derive(Default)]
struct MemState {
    commandes: Vec<Commande>,
    next_id: i32,
    next_ligne_id: i32,
}

/// In-memory drop-in for `PgCommandeStore`.
pub struct MemCommandeStore {
    state: Mutex<MemState>,
}

impl MemCommandeStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemState {
                commandes: Vec::new(),
                next_id: 1,
                next_ligne_id: 1,
            }),
        }
    }

    /// Insert an order directly, bypassing the HTTP layer. Returns its id.
    pub async fn seed(&self, client_id: i32, statut_value: &str, total: f64) -> i32 {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        state.commandes.push(Commande {
            id,
            client_id,
            statut: statut_value.to_string(),
            total,
            date_commande: now,
            date_modification: now,
            lignes: Vec::new(),
        });
        id
    }
}

#[async_trait]
impl CommandeStore for MemCommandeStore {
    async fn create(&self, commande: &CommandeCreate) -> Result<Commande, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let mut lignes = Vec::with_capacity(commande.lignes.len());
        for ligne in &commande.lignes {
            let ligne_id = state.next_ligne_id;
            state.next_ligne_id += 1;
            lignes.push(LigneCommande {
                id: ligne_id,
                commande_id: id,
                produit_id: ligne.produit_id,
                quantite: ligne.quantite,
                prix_unitaire: ligne.prix_unitaire,
            });
        }

        let now = Utc::now();
        let created = Commande {
            id,
            client_id: commande.client_id,
            statut: statut::PENDING.to_string(),
            total: commande.total(),
            date_commande: now,
            date_modification: now,
            lignes,
        };
        state.commandes.push(created.clone());
        Ok(created)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Commande>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .commandes
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Commande>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.commandes.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_client(&self, client_id: i32) -> Result<Vec<Commande>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .commandes
            .iter()
            .filter(|c| c.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn update_statut(&self, id: i32, statut: &str) -> Result<Option<Commande>, StoreError> {
        let mut state = self.state.lock().await;
        match state.commandes.iter_mut().find(|c| c.id == id) {
            Some(commande) => {
                commande.statut = statut.to_string();
                commande.date_modification = Utc::now();
                Ok(Some(commande.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.commandes.len();
        state.commandes.retain(|c| c.id != id);
        Ok(state.commandes.len() < before)
    }
}
