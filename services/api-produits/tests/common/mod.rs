//! Shared test doubles for the api-produits integration tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use api_produits::models::{Produit, ProduitCreate, ProduitUpdate};
use api_produits::store::{ProduitStore, StoreError};

#[derive(Default)]
struct MemState {
    produits: Vec<Produit>,
    next_id: i32,
}

/// In-memory drop-in for `PgProduitStore`.
pub struct MemProduitStore {
    state: Mutex<MemState>,
}

impl MemProduitStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemState {
                produits: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl ProduitStore for MemProduitStore {
    async fn create(&self, produit: &ProduitCreate) -> Result<Produit, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        let created = Produit {
            id,
            nom: produit.nom.clone(),
            description: produit.description.clone(),
            prix: produit.prix,
            stock: produit.stock,
            origine: produit.origine.clone(),
            poids_kg: produit.poids_kg,
            actif: true,
            date_creation: now,
            date_modification: now,
        };
        state.produits.push(created.clone());
        Ok(created)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Produit>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .produits
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Produit>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.produits.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: i32, update: &ProduitUpdate) -> Result<Option<Produit>, StoreError> {
        let mut state = self.state.lock().await;
        match state.produits.iter_mut().find(|p| p.id == id) {
            Some(produit) => {
                if let Some(nom) = &update.nom {
                    produit.nom = nom.clone();
                }
                if let Some(description) = &update.description {
                    produit.description = Some(description.clone());
                }
                if let Some(prix) = update.prix {
                    produit.prix = prix;
                }
                if let Some(stock) = update.stock {
                    produit.stock = stock;
                }
                if let Some(origine) = &update.origine {
                    produit.origine = Some(origine.clone());
                }
                if let Some(poids_kg) = update.poids_kg {
                    produit.poids_kg = poids_kg;
                }
                if let Some(actif) = update.actif {
                    produit.actif = actif;
                }
                produit.date_modification = Utc::now();
                Ok(Some(produit.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.produits.len();
        state.produits.retain(|p| p.id != id);
        Ok(state.produits.len() < before)
    }
}
