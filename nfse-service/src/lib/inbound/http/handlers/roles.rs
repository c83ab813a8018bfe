use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::entities::Creatable;
use super::entities::Editable;
use super::entities::Resource;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::role::models::Role;
use crate::domain::role::models::RoleDraft;
use crate::domain::role::models::RolePatch;
use crate::domain::values::Description;
use crate::domain::values::Name;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoleRequest {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleData {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Role> for RoleData {
    fn from(role: &Role) -> Self {
        Self {
            id: role.meta.id.0,
            name: role.name.as_str().to_string(),
            description: role.description.as_str().to_string(),
            active: role.meta.active,
            created_at: role.meta.created_at,
            updated_at: role.meta.updated_at,
        }
    }
}

impl Resource for Role {
    type Data = RoleData;

    const COLLECTION: &'static str = "roles";

    fn service(state: &AppState) -> Arc<dyn LifecyclePort<Self>> {
        Arc::clone(&state.roles)
    }
}

impl Creatable for Role {
    type CreateBody = CreateRoleRequest;

    fn draft(body: CreateRoleRequest) -> Result<RoleDraft, EntityError> {
        Ok(RoleDraft {
            name: Name::new(body.name)?,
            description: Description::new(body.description)?,
        })
    }
}

impl Editable for Role {
    type UpdateBody = UpdateRoleRequest;

    fn patch(body: UpdateRoleRequest) -> Result<RolePatch, EntityError> {
        Ok(RolePatch {
            name: body.name.map(Name::new).transpose()?,
            description: body.description.map(Description::new).transpose()?,
        })
    }
}
