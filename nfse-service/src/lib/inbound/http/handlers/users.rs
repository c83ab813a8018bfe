use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::entities::Resource;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;
use crate::inbound::http::router::AppState;

pub async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;

    state
        .user_service
        .update_user(RecordId(id), body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// Exact lookup by email or by phone; exactly one must be given.
pub async fn lookup_user(
    State(state): State<AppState>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Query(query) = query?;

    let found = match (query.email, query.phone) {
        (Some(email), None) => state.user_service.find_by_email(&email).await?,
        (None, Some(phone)) => {
            let phone = PhoneNumber::new(phone).map_err(EntityError::from)?;
            state.user_service.find_by_phone(&phone).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Provide exactly one of 'email' or 'phone'".to_string(),
            ))
        }
    };

    found
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    phone: String,
    password: String,
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, EntityError> {
        Ok(RegisterUserCommand {
            name: Name::new(self.name)?,
            email: EmailAddress::new(self.email)?,
            phone: PhoneNumber::new(self.phone)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, EntityError> {
        Ok(UpdateUserCommand {
            name: self.name.map(Name::new).transpose()?,
            email: self.email.map(EmailAddress::new).transpose()?,
            phone: self.phone.map(PhoneNumber::new).transpose()?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupQuery {
    email: Option<String>,
    phone: Option<String>,
}

/// User representation; the password hash is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.meta.id.0,
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            phone: user.phone.as_str().to_string(),
            active: user.meta.active,
            created_at: user.meta.created_at,
            updated_at: user.meta.updated_at,
        }
    }
}

impl Resource for User {
    type Data = UserData;

    const COLLECTION: &'static str = "users";

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>> {
        Arc::clone(&state.users)
    }
}
