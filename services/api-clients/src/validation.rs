//! Validation logic for customer payloads
//!
//! Field presence and types are handled by deserialization; this module
//! checks the values themselves.

use thiserror::Error;

use crate::models::{ClientCreate, ClientUpdate};

/// Validation errors for customer payloads
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("nom cannot be empty")]
    EmptyNom,

    #[error("prenom cannot be empty")]
    EmptyPrenom,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Structural email check: a local part, one `@`, a domain with a dot.
fn check_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.contains(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_create(client: &ClientCreate) -> Result<(), ValidationError> {
    if client.nom.trim().is_empty() {
        return Err(ValidationError::EmptyNom);
    }
    if client.prenom.trim().is_empty() {
        return Err(ValidationError::EmptyPrenom);
    }
    check_email(&client.email)
}

pub fn validate_update(update: &ClientUpdate) -> Result<(), ValidationError> {
    if let Some(nom) = &update.nom {
        if nom.trim().is_empty() {
            return Err(ValidationError::EmptyNom);
        }
    }
    if let Some(prenom) = &update.prenom {
        if prenom.trim().is_empty() {
            return Err(ValidationError::EmptyPrenom);
        }
    }
    if let Some(email) = &update.email {
        check_email(email)?;
    }
    Ok(())
}
