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
use crate::domain::recipient::models::Recipient;
use crate::domain::recipient::models::RecipientDraft;
use crate::domain::recipient::models::RecipientPatch;
use crate::domain::values::DocumentNumber;
use crate::domain::values::EmailAddress;
use crate::domain::values::Name;
use crate::domain::values::PhoneNumber;

const CONSTRAINTS: &[(&str, &str)] = &[("recipients_document_key", Recipient::DOCUMENT)];

#[derive(Debug, FromRow)]
struct RecipientRow {
    id: i64,
    name: String,
    document: String,
    phone: Option<String>,
    email: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecipientRow> for Recipient {
    type Error = EntityError;

    fn try_from(row: RecipientRow) -> Result<Self, Self::Error> {
        Ok(Recipient {
            meta: record_meta(row.id, row.active, row.created_at, row.updated_at),
            name: Name::new(row.name)?,
            document: DocumentNumber::from_stored(row.document),
            phone: row.phone.map(PhoneNumber::from_normalized),
            email: row.email.map(EmailAddress::new).transpose()?,
        })
    }
}

pub struct PostgresRecipientRepository {
    pool: PgPool,
}

impl PostgresRecipientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Recipient> for PostgresRecipientRepository {
    async fn insert(
        &self,
        draft: RecipientDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Recipient, EntityError> {
        let keys = Recipient::draft_unique_keys(&draft);

        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            INSERT INTO recipients (name, document, phone, email, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            RETURNING id, name, document, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(draft.name.as_str())
        .bind(draft.document.as_str())
        .bind(draft.phone.as_ref().map(PhoneNumber::as_str))
        .bind(draft.email.as_ref().map(EmailAddress::as_str))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error::<Recipient>(e, &keys, CONSTRAINTS))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Recipient>, EntityError> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, document, phone, email, active, created_at, updated_at
            FROM recipients
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Recipient::try_from).transpose()
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<Recipient>, EntityError> {
        if key.field != Recipient::DOCUMENT {
            return Err(unknown_field::<Recipient>(key));
        }

        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, document, phone, email, active, created_at, updated_at
            FROM recipients
            WHERE document = $1
            "#,
        )
        .bind(&key.value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(Recipient::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Recipient>, EntityError> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, document, phone, email, active, created_at, updated_at
            FROM recipients
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(Recipient::try_from).collect()
    }

    async fn search(
        &self,
        term: &SearchTerm,
        limit: usize,
    ) -> Result<Vec<Recipient>, EntityError> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, document, phone, email, active, created_at, updated_at
            FROM recipients
            WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
               OR ($2 <> '' AND regexp_replace(document, '[./-]', '', 'g') ILIKE '%' || $2 || '%' ESCAPE '\')
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

        rows.into_iter().map(Recipient::try_from).collect()
    }

    async fn update(
        &self,
        id: RecordId,
        patch: RecipientPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Recipient, EntityError> {
        let keys = Recipient::patch_unique_keys(&patch);

        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            UPDATE recipients
            SET name = COALESCE($2, name),
                document = COALESCE($3, document),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                updated_at = $6
            WHERE id = $1
            RETURNING id, name, document, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(patch.name.as_ref().map(Name::as_str))
        .bind(patch.document.as_ref().map(DocumentNumber::as_str))
        .bind(patch.phone.as_ref().map(PhoneNumber::as_str))
        .bind(patch.email.as_ref().map(EmailAddress::as_str))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error::<Recipient>(e, &keys, CONSTRAINTS))?;

        row.ok_or(EntityError::NotFound { kind: Recipient::KIND, id })?
            .try_into()
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Recipient, EntityError> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            UPDATE recipients
            SET active = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, document, phone, email, active, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.ok_or(EntityError::NotFound { kind: Recipient::KIND, id })?
            .try_into()
    }
}
