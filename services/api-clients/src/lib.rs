pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod store;
pub mod validation;
