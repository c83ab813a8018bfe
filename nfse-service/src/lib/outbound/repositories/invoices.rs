use std::convert::Infallible;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use super::escape_like;
use super::map_read_error;
use super::record_meta;
use super::search_limit;
use super::unknown_field;
use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::SearchTerm;
use crate::domain::entity::models::UniqueKey;
use crate::domain::entity::ports::EntityRepository;
use crate::domain::invoice::models::Invoice;
use crate::domain::invoice::models::InvoiceDraft;
use crate::domain::values::Amount;
use crate::domain::values::Code;
use crate::domain::values::DocumentNumber;
use crate::domain::values::Name;

const COLUMNS: &str = "id, number, series, cfop, issuer_name, issuer_cnpj, recipient_name, \
    recipient_document, total_cents, icms_cents, pis_cents, cofins_cents, discount_cents, \
    active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: i64,
    number: String,
    series: String,
    cfop: String,
    issuer_name: String,
    issuer_cnpj: String,
    recipient_name: String,
    recipient_document: String,
    total_cents: i64,
    icms_cents: Option<i64>,
    pis_cents: Option<i64>,
    cofins_cents: Option<i64>,
    discount_cents: Option<i64>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = EntityError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            meta: record_meta(row.id, row.active, row.created_at, row.updated_at),
            number: Code::from_stored(row.number),
            series: Code::from_stored(row.series),
            cfop: Code::from_stored(row.cfop),
            issuer_name: Name::new(row.issuer_name)?,
            issuer_cnpj: DocumentNumber::from_stored(row.issuer_cnpj),
            recipient_name: Name::new(row.recipient_name)?,
            recipient_document: DocumentNumber::from_stored(row.recipient_document),
            total: Amount::from_cents(row.total_cents),
            icms: row.icms_cents.map(Amount::from_cents),
            pis: row.pis_cents.map(Amount::from_cents),
            cofins: row.cofins_cents.map(Amount::from_cents),
            discount: row.discount_cents.map(Amount::from_cents),
        })
    }
}

pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Invoice> for PostgresInvoiceRepository {
    async fn insert(
        &self,
        draft: InvoiceDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Invoice, EntityError> {
        let sql = format!(
            r#"
            INSERT INTO invoices (
                number, series, cfop, issuer_name, issuer_cnpj, recipient_name,
                recipient_document, total_cents, icms_cents, pis_cents, cofins_cents,
                discount_cents, active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13, $13)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(draft.number.as_str())
            .bind(draft.series.as_str())
            .bind(draft.cfop.as_str())
            .bind(draft.issuer_name.as_str())
            .bind(draft.issuer_cnpj.as_str())
            .bind(draft.recipient_name.as_str())
            .bind(draft.recipient_document.as_str())
            .bind(draft.total.cents())
            .bind(draft.icms.map(Amount::cents))
            .bind(draft.pis.map(Amount::cents))
            .bind(draft.cofins.map(Amount::cents))
            .bind(draft.discount.map(Amount::cents))
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Invoice>, EntityError> {
        let sql = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;

        row.map(Invoice::try_from).transpose()
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<Invoice>, EntityError> {
        Err(unknown_field::<Invoice>(key))
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, EntityError> {
        let sql = format!("SELECT {COLUMNS} FROM invoices ORDER BY id");

        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<Invoice>, EntityError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM invoices
            WHERE issuer_name ILIKE '%' || $1 || '%' ESCAPE '\'
               OR ($2 <> '' AND regexp_replace(number, '[./-]', '', 'g') ILIKE '%' || $2 || '%' ESCAPE '\')
            ORDER BY id
            LIMIT $3
            "#
        );

        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(escape_like(term.raw()))
            .bind(escape_like(term.normalized()))
            .bind(search_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn update(
        &self,
        _id: RecordId,
        patch: Infallible,
        _updated_at: DateTime<Utc>,
    ) -> Result<Invoice, EntityError> {
        match patch {}
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Invoice, EntityError> {
        let sql = format!(
            "UPDATE invoices SET active = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id.0)
            .bind(active)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;

        row.ok_or(EntityError::NotFound { kind: Invoice::KIND, id })?
            .try_into()
    }
}
