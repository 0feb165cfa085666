//! Entity service — read-side use-cases over the local cache.

use homesync_domain::entity::{Domain, Entity};
use homesync_domain::error::{HomeSyncError, NotFoundError};
use homesync_domain::id::EntityId;

use crate::ports::EntityCache;

/// Application service for looking up cached entities.
pub struct EntityService<C> {
    cache: C,
}

impl<C: EntityCache> EntityService<C> {
    /// Create a new service reading from the given cache.
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    /// Look up an entity by id, returning an error if not cached.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSyncError::NotFound`] when no entity with `id` is cached,
    /// or a storage error from the cache.
    pub async fn get_entity(&self, id: &EntityId) -> Result<Entity, HomeSyncError> {
        self.cache.get(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Look up an entity by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the cache.
    pub async fn find_entity(&self, id: &EntityId) -> Result<Option<Entity>, HomeSyncError> {
        self.cache.get(id).await
    }

    /// List every cached entity.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the cache.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, HomeSyncError> {
        self.cache.list().await
    }

    /// List the cached entities of one domain.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the cache.
    pub async fn list_by_domain(&self, domain: &Domain) -> Result<Vec<Entity>, HomeSyncError> {
        self.cache.list_by_domain(domain).await
    }

    /// Resolve the members of a group or scene, in member order.
    ///
    /// Members that are not cached yet come back as placeholders so the
    /// caller can still render them.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the cache.
    pub async fn resolve_members(&self, entity: &Entity) -> Result<Vec<Entity>, HomeSyncError> {
        let mut members = Vec::with_capacity(entity.details().members().len());
        for id in entity.details().members() {
            let member = match self.cache.get(id).await? {
                Some(member) => member,
                None => {
                    tracing::debug!(group = %entity.id(), member = %id, "member not cached yet");
                    Entity::placeholder(id.clone())
                }
            };
            members.push(member);
        }
        Ok(members)
    }
}
