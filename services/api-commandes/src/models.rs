use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known order statuses. The column is an open string domain; these are the
/// values the service itself reads or writes.
pub mod statut {
    pub const PENDING: &str = "pending";
    pub const VALIDATED: &str = "validated";
    pub const SHIPPED: &str = "shipped";
    pub const DELIVERED: &str = "delivered";
    /// Terminal state applied by the reconciler when the customer is deleted.
    pub const CUSTOMER_DELETED: &str = "customer_deleted";
}

/// One order with its lines, as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commande {
    pub id: i32,
    pub client_id: i32,
    pub statut: String,
    pub total: f64,
    pub date_commande: DateTime<Utc>,
    pub date_modification: DateTime<Utc>,
    pub lignes: Vec<LigneCommande>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LigneCommande {
    pub id: i32,
    pub commande_id: i32,
    pub produit_id: i32,
    pub quantite: i32,
    pub prix_unitaire: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandeCreate {
    pub client_id: i32,
    pub lignes: Vec<LigneCommandeCreate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LigneCommandeCreate {
    pub produit_id: i32,
    #[serde(default = "default_quantite")]
    pub quantite: i32,
    pub prix_unitaire: f64,
}

fn default_quantite() -> i32 {
    1
}

/// Partial update; only the status can change after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandeUpdate {
    pub statut: Option<String>,
}

impl CommandeCreate {
    /// Order total in euros, two decimals, from the lines.
    pub fn total(&self) -> f64 {
        let total: f64 = self
            .lignes
            .iter()
            .map(|l| f64::from(l.quantite) * l.prix_unitaire)
            .sum();
        (total * 100.0).round() / 100.0
    }
}
