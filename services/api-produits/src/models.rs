use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry. The API returns the full row, so this doubles as the
/// response shape.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Produit {
    pub id: i32,
    pub nom: String,
    pub description: Option<String>,
    pub prix: f64,
    pub stock: i32,
    pub origine: Option<String>,
    pub poids_kg: f64,
    pub actif: bool,
    pub date_creation: DateTime<Utc>,
    pub date_modification: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProduitCreate {
    pub nom: String,
    pub description: Option<String>,
    pub prix: f64,
    #[serde(default)]
    pub stock: i32,
    pub origine: Option<String>,
    #[serde(default = "default_poids_kg")]
    pub poids_kg: f64,
}

fn default_poids_kg() -> f64 {
    1.0
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduitUpdate {
    pub nom: Option<String>,
    pub description: Option<String>,
    pub prix: Option<f64>,
    pub stock: Option<i32>,
    pub origine: Option<String>,
    pub poids_kg: Option<f64>,
    pub actif: Option<bool>,
}
