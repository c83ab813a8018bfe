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
use crate::domain::user::models::User;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserPatch;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

const CONSTRAINTS: &[(&str, &str)] = &[
    ("users_email_key", User::EMAIL),
    ("users_phone_key", User::PHONE),
];

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = EntityError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            meta: record_meta(row.id, row.active, row.created_at, row.updated_at),
            name: Name::new(row.name)?,
            email: EmailAddress::new(row.email)?,
            phone: PhoneNumber::from_normalized(row.phone),
            password_hash: row.password_hash,
        })
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<User> for PostgresUserRepository {
    async fn insert(
        &self,
        draft: UserDraft,
        created_at: DateTime<Utc>,
    ) -> Result<User, EntityError> {
        let keys = User::draft_unique_keys(&draft);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, phone, password_hash, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            RETURNING id, name, email, phone, password_hash, active, created_at, updated_at
            "#,
        )
        .bind(draft.name.as_str())
        .bind(draft.email.as_str())
        .bind(draft.phone.as_str())
        .bind(&draft.password_hash)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error::<User>(e, &keys, CONSTRAINTS))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<User>, EntityError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, phone, password_hash, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<User>, EntityError> {
        let sql = match key.field {
            User::EMAIL => {
                r#"
                SELECT id, name, email, phone, password_hash, active, created_at, updated_at
                FROM users
                WHERE email = $1
                "#
            }
            User::PHONE => {
                r#"
                SELECT id, name, email, phone, password_hash, active, created_at, updated_at
                FROM users
                WHERE phone = $1
                "#
            }
            _ => return Err(unknown_field::<User>(key)),
        };

        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(&key.value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;

        row.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, EntityError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, phone, password_hash, active, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<User>, EntityError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, phone, password_hash, active, created_at, updated_at
            FROM users
            WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
               OR ($2 <> '' AND regexp_replace(email, '[./-]', '', 'g') ILIKE '%' || $2 || '%' ESCAPE '\')
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

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(
        &self,
        id: RecordId,
        patch: UserPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<User, EntityError> {
        let keys = User::patch_unique_keys(&patch);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                password_hash = COALESCE($5, password_hash),
                updated_at = $6
            WHERE id = $1
            RETURNING id, name, email, phone, password_hash, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(patch.name.as_ref().map(Name::as_str))
        .bind(patch.email.as_ref().map(EmailAddress::as_str))
        .bind(patch.phone.as_ref().map(PhoneNumber::as_str))
        .bind(patch.password_hash.as_deref())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error::<User>(e, &keys, CONSTRAINTS))?;

        row.ok_or(EntityError::NotFound { kind: User::KIND, id })?
            .try_into()
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<User, EntityError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET active = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, email, phone, password_hash, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.ok_or(EntityError::NotFound { kind: User::KIND, id })?
            .try_into()
    }
}
