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
use crate::domain::issuer::models::Issuer;
use crate::domain::issuer::models::IssuerDraft;
use crate::domain::issuer::models::IssuerPatch;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

const CONSTRAINTS: &[(&str, &str)] = &[("issuers_cnpj_key", Issuer::CNPJ)];

#[derive(Debug, FromRow)]
struct IssuerRow {
    id: i64,
    name: String,
    cnpj: String,
    phone: String,
    email: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IssuerRow> for Issuer {
    type Error = EntityError;

    fn try_from(row: IssuerRow) -> Result<Self, Self::Error> {
        Ok(Issuer {
            meta: record_meta(row.id, row.active, row.created_at, row.updated_at),
            name: Name::new(row.name)?,
            cnpj: DocumentNumber::from_stored(row.cnpj),
            phone: PhoneNumber::from_normalized(row.phone),
            email: EmailAddress::new(row.email)?,
        })
    }
}

pub struct PostgresIssuerRepository {
    pool: PgPool,
}

impl PostgresIssuerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Issuer> for PostgresIssuerRepository {
    async fn insert(
        &self,
        draft: IssuerDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Issuer, EntityError> {
        let keys = Issuer::draft_unique_keys(&draft);

        let row = sqlx::query_as::<_, IssuerRow>(
            r#"
            INSERT INTO issuers (name, cnpj, phone, email, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            RETURNING id, name, cnpj, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(draft.name.as_str())
        .bind(draft.cnpj.as_str())
        .bind(draft.phone.as_str())
        .bind(draft.email.as_str())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error::<Issuer>(e, &keys, CONSTRAINTS))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Issuer>, EntityError> {
        let row = sqlx::query_as::<_, IssuerRow>(
            r#"
            SELECT id, name, cnpj, phone, email, active, created_at, updated_at
            FROM issuers
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Issuer::try_from).transpose()
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<Issuer>, EntityError> {
        if key.field != Issuer::CNPJ {
            return Err(unknown_field::<Issuer>(key));
        }

        let row = sqlx::query_as::<_, IssuerRow>(
            r#"
            SELECT id, name, cnpj, phone, email, active, created_at, updated_at
            FROM issuers
            WHERE cnpj = $1
            "#,
        )
        .bind(&key.value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Issuer::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Issuer>, EntityError> {
        let rows = sqlx::query_as::<_, IssuerRow>(
            r#"
            SELECT id, name, cnpj, phone, email, active, created_at, updated_at
            FROM issuers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(Issuer::try_from).collect()
    }

    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<Issuer>, EntityError> {
        let rows = sqlx::query_as::<_, IssuerRow>(
            r#"
            SELECT id, name, cnpj, phone, email, active, created_at, updated_at
            FROM issuers
            WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
               OR ($2 <> '' AND regexp_replace(cnpj, '[./-]', '', 'g') ILIKE '%' || $2 || '%' ESCAPE '\')
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

        rows.into_iter().map(Issuer::try_from).collect()
    }

    async fn update(
        &self,
        id: RecordId,
        patch: IssuerPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Issuer, EntityError> {
        let keys = Issuer::patch_unique_keys(&patch);

        let row = sqlx::query_as::<_, IssuerRow>(
            r#"
            UPDATE issuers
            SET name = COALESCE($2, name),
                cnpj = COALESCE($3, cnpj),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                updated_at = $6
            WHERE id = $1
            RETURNING id, name, cnpj, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(patch.name.as_ref().map(Name::as_str))
        .bind(patch.cnpj.as_ref().map(DocumentNumber::as_str))
        .bind(patch.phone.as_ref().map(PhoneNumber::as_str))
        .bind(patch.email.as_ref().map(EmailAddress::as_str))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error::<Issuer>(e, &keys, CONSTRAINTS))?;

        row.ok_or(EntityError::NotFound { kind: Issuer::KIND, id })?
            .try_into()
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Issuer, EntityError> {
        let row = sqlx::query_as::<_, IssuerRow>(
            r#"
            UPDATE issuers
            SET active = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, cnpj, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.ok_or(EntityError::NotFound { kind: Issuer::KIND, id })?
            .try_into()
    }
}
