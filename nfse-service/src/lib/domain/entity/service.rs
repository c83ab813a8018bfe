use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::entity::errors::EntityError;
use crate::domain::entity::models::Entity;
use crate::domain::entity::models::RecordId;
use crate::domain::entity::models::SearchTerm;
use crate::domain::entity::models::UniqueKey;
use crate::domain::entity::ports::EntityRepository;
use crate::domain::entity::ports::LifecyclePort;

/// Domain service implementation of the record lifecycle.
///
/// One instance per record type, over an injected repository.
pub struct LifecycleService<E, R>
where
    E: Entity,
    R: EntityRepository<E>,
{
    repository: Arc<R>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> LifecycleService<E, R>
where
    E: Entity,
    R: EntityRepository<E>,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }

    async fn fetch(&self, id: RecordId) -> Result<E, EntityError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(EntityError::NotFound { kind: E::KIND, id })
    }

    /// Fail with `Conflict` when a key is held by a record other than `owner`.
    async fn ensure_available(
        &self,
        keys: Vec<UniqueKey>,
        owner: Option<RecordId>,
    ) -> Result<(), EntityError> {
        for key in keys {
            if let Some(existing) = self.repository.find_by_unique(&key).await? {
                if Some(existing.id()) != owner {
                    return Err(EntityError::Conflict {
                        kind: E::KIND,
                        field: key.field,
                        value: key.value,
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<E, R> LifecyclePort<E> for LifecycleService<E, R>
where
    E: Entity,
    R: EntityRepository<E>,
{
    async fn create(&self, draft: E::Draft) -> Result<E, EntityError> {
        self.ensure_available(E::draft_unique_keys(&draft), None).await?;

        let created = self.repository.insert(draft, Utc::now()).await?;

        tracing::info!(kind = E::KIND, id = %created.id(), "Record created");
        Ok(created)
    }

    async fn get(&self, id: RecordId) -> Result<E, EntityError> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<E>, EntityError> {
        self.repository.list_all().await
    }

    async fn search(&self, term: &str) -> Result<Vec<E>, EntityError> {
        let term = SearchTerm::new(term)?;
        self.repository.search(&term, SearchTerm::LIMIT).await
    }

    async fn update(&self, id: RecordId, patch: E::Patch) -> Result<E, EntityError> {
        self.fetch(id).await?;

        if E::patch_is_empty(&patch) {
            return Err(EntityError::EmptyUpdate);
        }

        self.ensure_available(E::patch_unique_keys(&patch), Some(id)).await?;

        let updated = self.repository.update(id, patch, Utc::now()).await?;

        tracing::info!(kind = E::KIND, id = %id, "Record updated");
        Ok(updated)
    }

    async fn set_active(&self, id: RecordId, active: bool) -> Result<E, EntityError> {
        let entity = self.fetch(id).await?;

        match (entity.is_active(), active) {
            (true, true) => return Err(EntityError::AlreadyActive(E::KIND)),
            (false, false) => return Err(EntityError::AlreadyInactive(E::KIND)),
            _ => {}
        }

        let updated = self.repository.set_active(id, active, Utc::now()).await?;

        tracing::info!(kind = E::KIND, id = %id, active, "Record status changed");
        Ok(updated)
    }
}
