use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::Extension;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::auth::ports::AccessToken;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

/// OAuth2 password-flow login; `username` carries the email.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;

    state
        .auth_service
        .login(&form.username, &form.password)
        .await
        .map_err(ApiError::from)
        .map(|token| Json(token.into()))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<TokenResponse>, ApiError> {
    state
        .auth_service
        .refresh(&user)
        .await
        .map_err(ApiError::from)
        .map(|token| Json(token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Bare OAuth2 token body, without the response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type.to_string(),
        }
    }
}
