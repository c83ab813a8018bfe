use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::user::models::User;

/// Bearer token handed to a client after login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub const BEARER: &'static str = "Bearer";

    pub fn bearer(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: Self::BEARER,
            expires_at,
        }
    }
}

/// Port for login and per-request authentication.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange an email and password for a bearer token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Internal` - Lookup, hashing or signing failed
    async fn login(&self, identifier: &str, password: &str) -> Result<AccessToken, AuthError>;

    /// Resolve the user a bearer token was issued to.
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid, expired, or its subject no longer exists
    /// * `Internal` - Lookup failed
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;

    /// Issue a fresh token for an already authenticated user.
    ///
    /// Earlier tokens stay valid until their own expiry.
    async fn refresh(&self, user: &User) -> Result<AccessToken, AuthError>;
}
