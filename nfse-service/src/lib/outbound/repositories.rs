//! Storage adapters for the entity repositories.
//!
//! PostgreSQL adapters run plain runtime queries; every write is a single
//! `INSERT ... RETURNING` or `UPDATE ... RETURNING` statement. Unique
//! constraints in the schema back the service-level pre-checks.

pub mod invoices;
pub mod issuers;
pub mod memory;
pub mod recipients;
pub mod roles;
pub mod users;

pub use invoices::PostgresInvoiceRepository;
pub use issuers::PostgresIssuerRepository;
pub use memory::InMemoryRepository;
pub use recipients::PostgresRecipientRepository;
pub use roles::PostgresRoleRepository;
pub use users::PostgresUserRepository;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::UniqueKey;

/// Map a failed write, turning a unique violation on one of `constraints`
/// (constraint name, field) into `Conflict` with the offending value.
pub(crate) fn map_write_error<E: Entity>(
    error: sqlx::Error,
    keys: &[UniqueKey],
    constraints: &[(&str, &'static str)],
) -> EntityError {
    if let Some(db_err) = error.as_database_error() {
        if db_err.is_unique_violation() {
            let field = constraints
                .iter()
                .find(|(name, _)| db_err.constraint() == Some(*name))
                .map(|(_, field)| *field);

            if let Some(field) = field {
                let value = keys
                    .iter()
                    .find(|key| key.field == field)
                    .map(|key| key.value.clone())
                    .unwrap_or_default();

                return EntityError::Conflict {
                    kind: E::KIND,
                    field,
                    value,
                };
            }
        }
    }
    EntityError::DatabaseError(error.to_string())
}

pub(crate) fn map_read_error(error: sqlx::Error) -> EntityError {
    EntityError::DatabaseError(error.to_string())
}

pub(crate) fn unknown_field<E: Entity>(key: &UniqueKey) -> EntityError {
    EntityError::Unknown(format!("{} has no unique field {}", E::KIND, key.field))
}

/// Escape `%`, `_` and `\` so a search term is matched literally by
/// `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn record_meta(
    id: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> RecordMeta {
    RecordMeta {
        id: RecordId(id),
        active,
        created_at,
        updated_at,
    }
}

pub(crate) fn search_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
