//! Shared test doubles for the api-clients integration tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use api_clients::models::{Client, ClientCreate, ClientUpdate};
use api_clients::store::{ClientStore, StoreError};

#[derive(Default)]
struct MemState {
    clients: Vec<Client>,
    next_id: i32,
}

/// In-memory drop-in for `PgClientStore`.
pub struct MemClientStore {
    state: Mutex<MemState>,
}

impl MemClientStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemState {
                clients: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl ClientStore for MemClientStore {
    async fn create(&self, client: &ClientCreate) -> Result<Client, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let created = Client {
            id,
            nom: client.nom.clone(),
            prenom: client.prenom.clone(),
            email: client.email.clone(),
            telephone: client.telephone.clone(),
            adresse: client.adresse.clone(),
            actif: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.clients.push(created.clone());
        Ok(created)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Client>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .clients
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Client>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn update(&self, id: i32, update: &ClientUpdate) -> Result<Option<Client>, StoreError> {
        let mut state = self.state.lock().await;
        match state.clients.iter_mut().find(|c| c.id == id) {
            Some(client) => {
                if let Some(nom) = &update.nom {
                    client.nom = nom.clone();
                }
                if let Some(prenom) = &update.prenom {
                    client.prenom = prenom.clone();
                }
                if let Some(email) = &update.email {
                    client.email = email.clone();
                }
                if let Some(telephone) = &update.telephone {
                    client.telephone = Some(telephone.clone());
                }
                if let Some(adresse) = &update.adresse {
                    client.adresse = Some(adresse.clone());
                }
                if let Some(actif) = update.actif {
                    client.actif = actif;
                }
                client.updated_at = Some(Utc::now());
                Ok(Some(client.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.clients.len();
        state.clients.retain(|c| c.id != id);
        Ok(state.clients.len() < before)
    }
}
