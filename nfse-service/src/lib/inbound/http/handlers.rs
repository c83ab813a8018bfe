use axum::extract::rejection::FormRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;
use crate::domain::entity::errors::EntityError;

pub mod auth;
pub mod entities;
pub mod invoices;
pub mod issuers;
pub mod recipients;
pub mod roles;
pub mod users;

/// Successful response: the status and the bare resource representation.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(ApiErrorBody { detail: msg }),
                )
                    .into_response();
            }
        };

        (status, Json(ApiErrorBody { detail: message })).into_response()
    }
}

impl From<EntityError> for ApiError {
    fn from(err: EntityError) -> Self {
        match err {
            EntityError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            EntityError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            EntityError::InvalidName(_)
            | EntityError::InvalidEmail(_)
            | EntityError::InvalidPhone(_)
            | EntityError::InvalidDocument(_)
            | EntityError::InvalidDescription(_)
            | EntityError::InvalidCode(_)
            | EntityError::InvalidAmount(_)
            | EntityError::InvalidPassword(_)
            | EntityError::AlreadyActive(_)
            | EntityError::AlreadyInactive(_)
            | EntityError::SearchTermTooShort { .. }
            | EntityError::EmptyUpdate => ApiError::BadRequest(err.to_string()),
            EntityError::DatabaseError(_) | EntityError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Unauthorized(_) => {
                ApiError::Unauthorized("Could not validate credentials".to_string())
            }
            AuthError::Internal(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::models::RecordId;

    #[test]
    fn test_entity_error_status_mapping() {
        let not_found = EntityError::NotFound {
            kind: "issuer",
            id: RecordId(9),
        };
        let conflict = EntityError::Conflict {
            kind: "issuer",
            field: "cnpj",
            value: "12.345.678/0001-99".to_string(),
        };

        assert!(matches!(ApiError::from(not_found), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from(conflict), ApiError::Conflict(_)));
        assert_eq!(
            ApiError::from(EntityError::AlreadyActive("issuer")),
            ApiError::BadRequest("issuer already activated".to_string())
        );
        assert!(matches!(
            ApiError::from(EntityError::EmptyUpdate),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(EntityError::DatabaseError("boom".to_string())),
            ApiError::InternalServerError(_)
        ));
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response =
            ApiError::from(AuthError::Unauthorized("expired".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError::InternalServerError("password=hunter2".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"detail": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_success_body_is_the_bare_resource() {
        let response =
            ApiSuccess::new(StatusCode::CREATED, serde_json::json!({"id": 1})).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, serde_json::json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_error_body_carries_detail() {
        let response =
            ApiError::Conflict("issuer with cnpj already exists".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"detail": "issuer with cnpj already exists"})
        );
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
