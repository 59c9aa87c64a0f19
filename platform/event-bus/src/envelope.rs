//! # Event Envelope
//!
//! Wire contract for every event crossing a service boundary.
//!
//! ## Design Principles
//!
//! 1. **Single Source of Truth**: one envelope definition for all services
//! 2. **Exact wire shape**: the JSON produced here is the published contract;
//!    field names are part of it and never change casing or language
//! 3. **Tolerant reads**: consumers ignore unknown fields and assume nothing
//!    beyond `event` and the subject id
//!
//! ## Envelope Fields
//!
//! - `event`: event name, `<entity>_<action>` (doubles as the serde tag)
//! - `client_id` / `commande_id` / `produit_id`: subject id, keyed by entity
//! - `data`: denormalized entity fields, present on created/updated events
//! - `statut`: new order status, only on `commande_updated`
//! - `produit_nom` / `stock_actuel` / `seuil_alerte`: only on
//!   `produit_stock_low`
//! - `timestamp`: production time, ISO 8601, UTC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock level below which the products service raises `produit_stock_low`.
pub const SEUIL_STOCK_BAS: i32 = 10;

/// Customer fields embedded in `client_created` / `client_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientData {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
}

/// Order fields embedded in `commande_created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandeData {
    pub client_id: i32,
    pub total: f64,
    pub statut: String,
}

/// Product fields embedded in `produit_created` / `produit_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProduitData {
    pub nom: String,
    pub prix: f64,
    pub stock: i32,
}

/// Event name plus the event-specific fields, tagged by `event`.
///
/// Each variant serializes to the exact top-level fields the original wire
/// contract carries for that event: the subject id key differs per entity,
/// deletions carry no `data`, `commande_updated` carries `statut` instead of
/// `data`, and the stock alert carries its own flat fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EventBody {
    #[serde(rename = "client_created")]
    ClientCreated { client_id: i32, data: ClientData },
    #[serde(rename = "client_updated")]
    ClientUpdated { client_id: i32, data: ClientData },
    #[serde(rename = "client_deleted")]
    ClientDeleted { client_id: i32 },
    #[serde(rename = "commande_created")]
    CommandeCreated { commande_id: i32, data: CommandeData },
    #[serde(rename = "commande_updated")]
    CommandeUpdated { commande_id: i32, statut: String },
    #[serde(rename = "commande_deleted")]
    CommandeDeleted { commande_id: i32 },
    #[serde(rename = "produit_created")]
    ProduitCreated { produit_id: i32, data: ProduitData },
    #[serde(rename = "produit_updated")]
    ProduitUpdated { produit_id: i32, data: ProduitData },
    #[serde(rename = "produit_deleted")]
    ProduitDeleted { produit_id: i32 },
    #[serde(rename = "produit_stock_low")]
    ProduitStockLow {
        produit_id: i32,
        produit_nom: String,
        stock_actuel: i32,
        seuil_alerte: i32,
    },
}

impl EventBody {
    /// Routing key this event is published under.
    pub fn routing_key(&self) -> &'static str {
        match self {
            EventBody::ClientCreated { .. } => "client.created",
            EventBody::ClientUpdated { .. } => "client.updated",
            EventBody::ClientDeleted { .. } => "client.deleted",
            EventBody::CommandeCreated { .. } => "commande.created",
            EventBody::CommandeUpdated { .. } => "commande.updated",
            EventBody::CommandeDeleted { .. } => "commande.deleted",
            EventBody::ProduitCreated { .. } => "produit.created",
            EventBody::ProduitUpdated { .. } => "produit.updated",
            EventBody::ProduitDeleted { .. } => "produit.deleted",
            EventBody::ProduitStockLow { .. } => "produit.stock_low",
        }
    }

    /// Id of the entity the event is about, regardless of entity kind.
    pub fn subject_id(&self) -> i32 {
        match *self {
            EventBody::ClientCreated { client_id, .. }
            | EventBody::ClientUpdated { client_id, .. }
            | EventBody::ClientDeleted { client_id } => client_id,
            EventBody::CommandeCreated { commande_id, .. }
            | EventBody::CommandeUpdated { commande_id, .. }
            | EventBody::CommandeDeleted { commande_id } => commande_id,
            EventBody::ProduitCreated { produit_id, .. }
            | EventBody::ProduitUpdated { produit_id, .. }
            | EventBody::ProduitDeleted { produit_id }
            | EventBody::ProduitStockLow { produit_id, .. } => produit_id,
        }
    }
}

/// One published event: body fields flattened next to the timestamp.
///
/// Immutable once published. Consumers parse leniently; publishers always
/// serialize every field of the variant.
///
/// # Examples
///
/// ```rust
/// use event_bus::{Envelope, EventBody};
///
/// let envelope = Envelope::new(EventBody::ClientDeleted { client_id: 42 });
/// assert_eq!(envelope.body.routing_key(), "client.deleted");
/// let bytes = envelope.to_bytes().unwrap();
/// let parsed = Envelope::from_bytes(&bytes).unwrap();
/// assert_eq!(parsed.body, envelope.body);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub body: EventBody,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Wrap an event body with the current UTC time.
    pub fn new(body: EventBody) -> Self {
        Self {
            body,
            timestamp: Utc::now(),
        }
    }

    pub fn routing_key(&self) -> &'static str {
        self.body.routing_key()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_timestamp() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_client_created_wire_shape() {
        let envelope = Envelope {
            body: EventBody::ClientCreated {
                client_id: 7,
                data: ClientData {
                    nom: "Martin".to_string(),
                    prenom: "Sophie".to_string(),
                    email: "sophie.martin@example.com".to_string(),
                    telephone: Some("0601020304".to_string()),
                    adresse: None,
                },
            },
            timestamp: fixed_timestamp(),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "client_created",
                "client_id": 7,
                "data": {
                    "nom": "Martin",
                    "prenom": "Sophie",
                    "email": "sophie.martin@example.com",
                    "telephone": "0601020304",
                    "adresse": null
                },
                "timestamp": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_client_deleted_wire_shape_has_no_data() {
        let envelope = Envelope {
            body: EventBody::ClientDeleted { client_id: 42 },
            timestamp: fixed_timestamp(),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "client_deleted",
                "client_id": 42,
                "timestamp": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_commande_updated_carries_statut_not_data() {
        let envelope = Envelope {
            body: EventBody::CommandeUpdated {
                commande_id: 12,
                statut: "shipped".to_string(),
            },
            timestamp: fixed_timestamp(),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "commande_updated",
                "commande_id": 12,
                "statut": "shipped",
                "timestamp": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_stock_low_wire_shape() {
        let envelope = Envelope {
            body: EventBody::ProduitStockLow {
                produit_id: 3,
                produit_nom: "Café Burkina".to_string(),
                stock_actuel: 4,
                seuil_alerte: SEUIL_STOCK_BAS,
            },
            timestamp: fixed_timestamp(),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "produit_stock_low",
                "produit_id": 3,
                "produit_nom": "Café Burkina",
                "stock_actuel": 4,
                "seuil_alerte": 10,
                "timestamp": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let envelopes = vec![
            Envelope::new(EventBody::ClientUpdated {
                client_id: 1,
                data: ClientData {
                    nom: "Durand".to_string(),
                    prenom: "Paul".to_string(),
                    email: "paul@example.com".to_string(),
                    telephone: None,
                    adresse: Some("12 rue des Lilas".to_string()),
                },
            }),
            Envelope::new(EventBody::CommandeCreated {
                commande_id: 8,
                data: CommandeData {
                    client_id: 1,
                    total: 33.0,
                    statut: "pending".to_string(),
                },
            }),
            Envelope::new(EventBody::ProduitDeleted { produit_id: 5 }),
        ];

        for envelope in envelopes {
            let bytes = envelope.to_bytes().unwrap();
            let parsed = Envelope::from_bytes(&bytes).unwrap();
            assert_eq!(parsed, envelope);
        }
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = json!({
            "event": "client_deleted",
            "client_id": 42,
            "timestamp": "2024-01-01T00:00:00Z",
            "emitted_by": "api-clients",
            "trace": {"span": 1}
        });

        let envelope: Envelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.body, EventBody::ClientDeleted { client_id: 42 });
    }

    #[test]
    fn test_missing_subject_id_is_an_error() {
        let raw = json!({
            "event": "client_deleted",
            "timestamp": "2024-01-01T00:00:00Z"
        });

        assert!(serde_json::from_value::<Envelope>(raw).is_err());
    }

    #[test]
    fn test_routing_keys() {
        let cases = [
            (EventBody::ClientDeleted { client_id: 1 }, "client.deleted"),
            (
                EventBody::CommandeDeleted { commande_id: 1 },
                "commande.deleted",
            ),
            (
                EventBody::ProduitDeleted { produit_id: 1 },
                "produit.deleted",
            ),
        ];

        for (body, expected) in cases {
            assert_eq!(body.routing_key(), expected);
        }
    }

    #[test]
    fn test_new_sets_a_recent_timestamp() {
        let before = Utc::now();
        let envelope = Envelope::new(EventBody::ClientDeleted { client_id: 9 });
        let after = Utc::now();

        assert!(envelope.timestamp >= before && envelope.timestamp <= after);
    }
}
