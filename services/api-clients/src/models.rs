use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Customer row as stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Client {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub actif: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What the API returns. Contact details stay off the read surface; they
/// travel only inside `client_created` / `client_updated` events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientResponse {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub actif: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            nom: client.nom,
            prenom: client.prenom,
            email: client.email,
            actif: client.actif,
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientCreate {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientUpdate {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub actif: Option<bool>,
}
