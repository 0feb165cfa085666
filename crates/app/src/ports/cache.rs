//! Local cache port — persistent entity store keyed by entity id.

use std::future::Future;

use homesync_domain::entity::{Domain, Entity};
use homesync_domain::error::HomeSyncError;
use homesync_domain::id::EntityId;

/// Persistent, keyed store of the last known entity states.
///
/// Writes replace the whole record for an id; there is no partial update.
/// Records are removed only by [`reset`](Self::reset).
pub trait EntityCache {
    /// Insert `entity`, or fully replace the record with the same id.
    fn upsert(&self, entity: &Entity) -> impl Future<Output = Result<(), HomeSyncError>> + Send;

    /// Upsert every entity in one transaction. Returns the number written.
    fn upsert_all(
        &self,
        entities: &[Entity],
    ) -> impl Future<Output = Result<usize, HomeSyncError>> + Send;

    fn get(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HomeSyncError>> + Send;

    /// Every cached entity, ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send;

    fn list_by_domain(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send;

    /// Remove every record. Returns the number removed.
    fn reset(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send;

    fn count(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send;
}

impl<T: EntityCache + Send + Sync> EntityCache for std::sync::Arc<T> {
    fn upsert(&self, entity: &Entity) -> impl Future<Output = Result<(), HomeSyncError>> + Send {
        (**self).upsert(entity)
    }

    fn upsert_all(
        &self,
        entities: &[Entity],
    ) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        (**self).upsert_all(entities)
    }

    fn get(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HomeSyncError>> + Send {
        (**self).get(id)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        (**self).list()
    }

    fn list_by_domain(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        (**self).list_by_domain(domain)
    }

    fn reset(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        (**self).reset()
    }

    fn count(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        (**self).count()
    }
}
