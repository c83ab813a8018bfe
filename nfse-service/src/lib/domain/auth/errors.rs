use thiserror::Error;

/// Errors surfaced by the authentication gate.
///
/// Login failures are deliberately generic: an unknown account and a wrong
/// password produce the same `InvalidCredentials`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
