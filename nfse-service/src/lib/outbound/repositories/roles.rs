use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use super::escape_like;
use super::map_read_error;
use super::map_write_error;
use super::record_meta;
use super::search_limit;
use super::unknown_field;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::SearchTerm;
use crate::domain::entity::models::UniqueKey;
use crate::domain::entity::ports::EntityRepository;
use crate::domain::role::models::Role;
use crate::domain::role::models::RoleDraft;
use crate::domain::role::models::RolePatch;
use crate::domain::values::Description;
use crate::domain::values::Name;

const CONSTRAINTS: &[(&str, &str)] = &[("roles_name_key", Role::NAME)];

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = EntityError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Role {
            meta: record_meta(row.id, row.active, row.created_at, row.updated_at),
            name: Name::new(row.name)?,
            description: Description::new(row.description)?,
        })
    }
}

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Role> for PostgresRoleRepository {
    async fn insert(
        &self,
        draft: RoleDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Role, EntityError> {
        let keys = Role::draft_unique_keys(&draft);

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, description, active, created_at, updated_at)
            VALUES ($1, $2, TRUE, $3, $3)
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(draft.name.as_str())
        .bind(draft.description.as_str())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error::<Role>(e, &keys, CONSTRAINTS))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Role>, EntityError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Role::try_from).transpose()
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<Role>, EntityError> {
        if key.field != Role::NAME {
            return Err(unknown_field::<Role>(key));
        }

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(&key.value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Role::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Role>, EntityError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM roles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<Role>, EntityError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM roles
            WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
               OR ($2 <> '' AND regexp_replace(name, '[./-]', '', 'g') ILIKE '%' || $2 || '%' ESCAPE '\')
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(escape_like(term.raw()))
        .bind(escape_like(term.normalized()))
        .bind(search_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn update(
        &self,
        id: RecordId,
        patch: RolePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Role, EntityError> {
        let keys = Role::patch_unique_keys(&patch);

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = $4
            WHERE id = $1
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(patch.name.as_ref().map(Name::as_str))
        .bind(patch.description.as_ref().map(Description::as_str))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error::<Role>(e, &keys, CONSTRAINTS))?;

        row.ok_or(EntityError::NotFound { kind: Role::KIND, id })?
            .try_into()
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Role, EntityError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET active = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.ok_or(EntityError::NotFound { kind: Role::KIND, id })?
            .try_into()
    }
}
