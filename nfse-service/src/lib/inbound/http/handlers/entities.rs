//! Handlers shared by every entity collection.
//!
//! Each collection implements [`Resource`], plus [`Creatable`] and
//! [`Editable`] when its request bodies map directly onto the lifecycle.
//! The router instantiates these handlers per type.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::ports::LifecyclePort;
use crate::inbound::http::router::AppState;

/// An entity exposed as an HTTP collection.
pub trait Resource: Entity {
    /// Response representation.
    type Data: Serialize + PartialEq + for<'a> From<&'a Self> + Send;

    /// Collection path segment and list key ("issuers").
    const COLLECTION: &'static str;

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>>;
}

/// A resource whose create body converts straight into a draft.
pub trait Creatable: Resource {
    type CreateBody: DeserializeOwned + Send + 'static;

    fn draft(body: Self::CreateBody) -> Result<Self::Draft, EntityError>;
}

/// A creatable resource whose update body converts straight into a patch.
pub trait Editable: Creatable {
    type UpdateBody: DeserializeOwned + Send + 'static;

    fn patch(body: Self::UpdateBody) -> Result<Self::Patch, EntityError>;
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

pub async fn create<E: Creatable>(
    State(state): State<AppState>,
    body: Result<Json<E::CreateBody>, JsonRejection>,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    let Json(body) = body?;

    E::service(&state)
        .create(E::draft(body)?)
        .await
        .map_err(ApiError::from)
        .map(|ref entity| ApiSuccess::new(StatusCode::CREATED, E::Data::from(entity)))
}

pub async fn get_one<E: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    let Path(id) = id?;

    E::service(&state)
        .get(RecordId(id))
        .await
        .map_err(ApiError::from)
        .map(|ref entity| ApiSuccess::new(StatusCode::OK, E::Data::from(entity)))
}

/// Full collection, keyed by the collection name: `{"issuers": [...]}`.
pub async fn list<E: Resource>(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Map<String, Value>>, ApiError> {
    let entities = E::service(&state).list().await?;

    let data = entities
        .iter()
        .map(|entity| serde_json::to_value(E::Data::from(entity)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    let mut body = Map::new();
    body.insert(E::COLLECTION.to_string(), Value::Array(data));

    Ok(ApiSuccess::new(StatusCode::OK, body))
}

pub async fn search<E: Resource>(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<ApiSuccess<Vec<E::Data>>, ApiError> {
    let Query(query) = query?;

    E::service(&state)
        .search(&query.q)
        .await
        .map_err(ApiError::from)
        .map(|entities| {
            let data: Vec<E::Data> = entities.iter().map(E::Data::from).collect();
            ApiSuccess::new(StatusCode::OK, data)
        })
}

pub async fn update<E: Editable>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<E::UpdateBody>, JsonRejection>,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;

    E::service(&state)
        .update(RecordId(id), E::patch(body)?)
        .await
        .map_err(ApiError::from)
        .map(|ref entity| ApiSuccess::new(StatusCode::OK, E::Data::from(entity)))
}

pub async fn activate<E: Resource>(
    state: State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    set_active::<E>(state, id, true).await
}

pub async fn deactivate<E: Resource>(
    state: State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    set_active::<E>(state, id, false).await
}

async fn set_active<E: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    active: bool,
) -> Result<ApiSuccess<E::Data>, ApiError> {
    let Path(id) = id?;

    E::service(&state)
        .set_active(RecordId(id), active)
        .await
        .map_err(ApiError::from)
        .map(|ref entity| ApiSuccess::new(StatusCode::OK, E::Data::from(entity)))
}
