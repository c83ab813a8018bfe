use thiserror::Error;

use crate::domain::entity::models::RecordId;
use crate::domain::values::AmountError;
use crate::domain::values::CodeError;
use crate::domain::values::DescriptionError;
use crate::domain::values::DocumentError;
use crate::domain::values::EmailError;
use crate::domain::values::NameError;
use crate::domain::values::PhoneNumberError;

/// Top-level error for all entity lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum EntityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    InvalidPhone(#[from] PhoneNumberError),

    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] DocumentError),

    #[error("Invalid description: {0}")]
    InvalidDescription(#[from] DescriptionError),

    #[error("Invalid code: {0}")]
    InvalidCode(#[from] CodeError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    // Domain-level errors
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("{kind} with this {field} already exists: {value}")]
    Conflict {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0} already activated")]
    AlreadyActive(&'static str),

    #[error("{0} already deactivated")]
    AlreadyInactive(&'static str),

    #[error("Search term too short: minimum {min} characters, got {actual}")]
    SearchTermTooShort { min: usize, actual: usize },

    #[error("No fields to update")]
    EmptyUpdate,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
