use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Authentication coordinator combining password verification and token issuing.
///
/// Holds a decoy hash computed at construction: a login attempt for an
/// unknown account is verified against it so that "no such account" and
/// "wrong password" both cost one Argon2 verification.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_lifetime: Duration,
    decoy_hash: String,
}

/// Result of successful authentication or token refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
    /// Instant from which the token is rejected
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `algorithm` - HMAC algorithm name ("HS256", "HS384", "HS512")
    /// * `token_lifetime` - Validity window of issued tokens
    ///
    /// # Errors
    /// * `JwtError` - Algorithm not supported
    /// * `PasswordError` - Decoy hash could not be computed
    pub fn new(
        jwt_secret: &[u8],
        algorithm: &str,
        token_lifetime: Duration,
    ) -> Result<Self, AuthenticationError> {
        Self::with_hasher(
            PasswordHasher::new(),
            jwt_secret,
            algorithm,
            token_lifetime,
        )
    }

    /// Create an authenticator around a preconfigured password hasher.
    pub fn with_hasher(
        password_hasher: PasswordHasher,
        jwt_secret: &[u8],
        algorithm: &str,
        token_lifetime: Duration,
    ) -> Result<Self, AuthenticationError> {
        let jwt_handler = JwtHandler::with_algorithm(jwt_secret, algorithm)?;
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            jwt_handler,
            token_lifetime,
            decoy_hash,
        })
    }

    /// Validity window of issued tokens.
    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a login attempt and issue a token for `subject`.
    ///
    /// `stored_hash` is `None` when no account matched the identifier; the
    /// password is then checked against the decoy hash and the attempt fails
    /// with the same error as a wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or password mismatch
    /// * `PasswordError` - Stored hash is unparseable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
        subject: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let Some(stored_hash) = stored_hash else {
            let _ = self.password_hasher.verify(password, &self.decoy_hash);
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(subject)?)
    }

    /// Issue a token for an already-authenticated subject.
    ///
    /// Used by refresh flows; prior tokens stay valid until their own expiry.
    pub fn issue_token(&self, subject: &str) -> Result<AuthenticationResult, JwtError> {
        self.issue_token_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_token_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, JwtError> {
        let claims = Claims::for_subject(subject, now, self.token_lifetime);
        let expires_at = now + self.token_lifetime;
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature or structure invalid
    /// * `TokenExpired` - Expiry has passed
    /// * `MissingClaim` - `sub` or `exp` absent
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_token_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// A token is accepted on `[iat, exp)`.
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp".to_string()));
        }
        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }
        if claims.sub.as_deref().map_or(true, str::is_empty) {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        Ok(claims)
    }
}
