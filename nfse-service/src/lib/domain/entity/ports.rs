use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::SearchTerm;
use crate::domain::entity::models::UniqueKey;

/// Port for the create / read / update / status operations of one record type.
#[async_trait]
pub trait LifecyclePort<E: Entity>: Send + Sync + 'static {
    /// Create a new active record.
    ///
    /// # Errors
    /// * `Conflict` - A unique field of the draft is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, draft: E::Draft) -> Result<E, EntityError>;

    /// Retrieve a record by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get(&self, id: RecordId) -> Result<E, EntityError>;

    /// Retrieve every record, ordered by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self) -> Result<Vec<E>, EntityError>;

    /// Find up to [`SearchTerm::LIMIT`] records whose name or natural key
    /// contains `term`.
    ///
    /// # Errors
    /// * `SearchTermTooShort` - Term has fewer than two characters
    /// * `DatabaseError` - Database operation failed
    async fn search(&self, term: &str) -> Result<Vec<E>, EntityError>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `EmptyUpdate` - Patch carries no field
    /// * `Conflict` - A unique field of the patch belongs to another record
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, id: RecordId, patch: E::Patch) -> Result<E, EntityError>;

    /// Move the record to the requested status.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `AlreadyActive` / `AlreadyInactive` - Record already has that status
    /// * `DatabaseError` - Database operation failed
    async fn set_active(&self, id: RecordId, active: bool) -> Result<E, EntityError>;
}

/// Persistence operations for one record type.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync + 'static {
    /// Persist a draft and return it with its generated identifier.
    ///
    /// # Errors
    /// * `Conflict` - A unique constraint rejected the row
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, draft: E::Draft, created_at: DateTime<Utc>) -> Result<E, EntityError>;

    /// Retrieve a record by identifier (None if not found).
    async fn find_by_id(&self, id: RecordId) -> Result<Option<E>, EntityError>;

    /// Retrieve the record holding a unique field value (None if not found).
    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<E>, EntityError>;

    /// Retrieve all records ordered by identifier.
    async fn list_all(&self) -> Result<Vec<E>, EntityError>;

    /// Retrieve at most `limit` records matching `term`.
    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<E>, EntityError>;

    /// Merge the fields supplied in `patch` into the stored record and
    /// refresh its `updated_at`. Fields absent from the patch, including
    /// the status flag, keep their stored values.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `Conflict` - A unique constraint rejected the new values
    /// * `DatabaseError` - Database operation failed
    async fn update(
        &self,
        id: RecordId,
        patch: E::Patch,
        updated_at: DateTime<Utc>,
    ) -> Result<E, EntityError>;

    /// Write only the status flag and `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<E, EntityError>;
}
