use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::AuthenticationResult;
use auth::Authenticator;
use auth::JwtError;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AccessToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::entity::models::Entity;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;

/// Authentication gate over the user store and the token authenticator.
pub struct AuthService<US>
where
    US: UserServicePort,
{
    users: Arc<US>,
    authenticator: Authenticator,
    reject_inactive_subjects: bool,
}

impl<US> AuthService<US>
where
    US: UserServicePort,
{
    pub fn new(users: Arc<US>, authenticator: Authenticator) -> Self {
        Self {
            users,
            authenticator,
            reject_inactive_subjects: false,
        }
    }

    /// Refuse logins and tokens of deactivated accounts.
    pub fn reject_inactive_subjects(mut self, reject: bool) -> Self {
        self.reject_inactive_subjects = reject;
        self
    }

    async fn lookup(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

fn access_token(result: AuthenticationResult) -> AccessToken {
    AccessToken::bearer(result.access_token, result.expires_at)
}

#[async_trait]
impl<US> AuthServicePort for AuthService<US>
where
    US: UserServicePort,
{
    async fn login(&self, identifier: &str, password: &str) -> Result<AccessToken, AuthError> {
        let user = self.lookup(identifier).await?;
        let stored_hash = user.as_ref().map(|user| user.password_hash.as_str());

        let result = match self
            .authenticator
            .authenticate(password, stored_hash, identifier)
        {
            Ok(result) => result,
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::info!("Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        if self.reject_inactive_subjects && user.as_ref().is_some_and(|user| !user.is_active()) {
            tracing::info!("Login rejected for inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(access_token(result))
    }

    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.authenticator.verify_token(token).map_err(|e| {
            match &e {
                JwtError::TokenExpired => tracing::warn!("Rejected expired token"),
                other => tracing::warn!(error = %other, "Rejected invalid token"),
            }
            AuthError::Unauthorized(e.to_string())
        })?;

        let subject = claims.sub.unwrap_or_default();
        let user = self.lookup(&subject).await?.ok_or_else(|| {
            tracing::warn!("Token subject no longer exists");
            AuthError::Unauthorized("unknown subject".to_string())
        })?;

        if self.reject_inactive_subjects && !user.is_active() {
            tracing::warn!(user_id = %user.id(), "Token subject is inactive");
            return Err(AuthError::Unauthorized("inactive subject".to_string()));
        }

        Ok(user)
    }

    async fn refresh(&self, user: &User) -> Result<AccessToken, AuthError> {
        self.authenticator
            .issue_token(user.email.as_str())
            .map(access_token)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}
