pub mod auth;
pub mod config;
pub mod consumer;
pub mod consumer_tasks;
pub mod db;
pub mod error;
pub mod health;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod store;

pub use consumer_tasks::{start_client_events_consumer, start_produit_events_consumer};
