use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::RecordMeta;
use crate::domain::entity::models::SearchTerm;
use crate::domain::entity::models::UniqueKey;
use crate::domain::entity::ports::EntityRepository;

#[derive(Debug)]
struct Table<E> {
    last_id: i64,
    rows: BTreeMap<RecordId, E>,
}

impl<E: Entity> Table<E> {
    /// Key in `keys` already held by a record other than `owner`, if any.
    fn taken_key(&self, keys: Vec<UniqueKey>, owner: Option<RecordId>) -> Option<UniqueKey> {
        keys.into_iter().find(|key| {
            self.rows.values().any(|row| {
                Some(row.id()) != owner && row.unique_keys().iter().any(|held| held == key)
            })
        })
    }
}

/// Process-local store for running without a database.
///
/// Unique fields are checked under the write lock, so two concurrent
/// inserts of the same key cannot both succeed.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<E> {
    table: Arc<RwLock<Table<E>>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                last_id: 0,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn conflict<E: Entity>(key: UniqueKey) -> EntityError {
    EntityError::Conflict {
        kind: E::KIND,
        field: key.field,
        value: key.value,
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for InMemoryRepository<E> {
    async fn insert(&self, draft: E::Draft, created_at: DateTime<Utc>) -> Result<E, EntityError> {
        let mut table = self.table.write().await;

        if let Some(key) = table.taken_key(E::draft_unique_keys(&draft), None) {
            return Err(conflict::<E>(key));
        }

        table.last_id += 1;
        let id = RecordId(table.last_id);
        let entity = E::materialize(draft, RecordMeta::created(id, created_at));
        table.rows.insert(id, entity.clone());

        Ok(entity)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<E>, EntityError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_unique(&self, key: &UniqueKey) -> Result<Option<E>, EntityError> {
        let table = self.table.read().await;

        Ok(table
            .rows
            .values()
            .find(|row| row.unique_keys().iter().any(|held| held == key))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<E>, EntityError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn search(&self, term: &SearchTerm, limit: usize) -> Result<Vec<E>, EntityError> {
        let table = self.table.read().await;

        Ok(table
            .rows
            .values()
            .filter(|row| term.matches(row.search_name(), row.search_key()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: RecordId,
        patch: E::Patch,
        updated_at: DateTime<Utc>,
    ) -> Result<E, EntityError> {
        let mut table = self.table.write().await;

        let mut entity = table
            .rows
            .get(&id)
            .cloned()
            .ok_or(EntityError::NotFound { kind: E::KIND, id })?;
        if let Some(key) = table.taken_key(E::patch_unique_keys(&patch), Some(id)) {
            return Err(conflict::<E>(key));
        }

        entity.apply(patch);
        entity.touch(updated_at);
        table.rows.insert(id, entity.clone());

        Ok(entity)
    }

    async fn set_active(
        &self,
        id: RecordId,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<E, EntityError> {
        let mut table = self.table.write().await;

        let entity = table
            .rows
            .get_mut(&id)
            .ok_or(EntityError::NotFound { kind: E::KIND, id })?;
        entity.set_active(active);
        entity.touch(updated_at);

        Ok(entity.clone())
    }
}
