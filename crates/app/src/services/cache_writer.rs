//! Cache writer — the single task that owns the cache's write path.
//!
//! Stream handlers, full-state refreshes and command results all enqueue
//! writes here instead of touching the cache directly, so writes are applied
//! one at a time in arrival order. Every applied entity is then broadcast as
//! [`SyncNotification::EntityChanged`].
//!
//! An incoming entity whose `last_updated` is older than the cached one is
//! skipped, so a slow full-state fetch cannot roll back a newer stream update.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use homesync_domain::entity::Entity;
use homesync_domain::error::HomeSyncError;
use homesync_domain::id::EntityId;

use crate::ports::{EntityCache, EventPublisher, SyncNotification};

/// The writer task is no longer running.
#[derive(Debug, thiserror::Error)]
#[error("cache writer is not running")]
pub struct WriterStopped;

type Reply<T> = oneshot::Sender<Result<T, HomeSyncError>>;

enum WriteCommand {
    Upsert {
        entity: Box<Entity>,
        reply: Option<Reply<bool>>,
    },
    UpsertAll {
        entities: Vec<Entity>,
        reply: Option<Reply<usize>>,
    },
    Reset {
        reply: Reply<usize>,
    },
}

/// Handle to the writer task. Cheap to clone.
///
/// The task stops once every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct CacheWriter {
    sender: mpsc::UnboundedSender<WriteCommand>,
}

impl CacheWriter {
    /// Spawn the writer task on the current runtime.
    pub fn spawn<C, P>(cache: C, publisher: P) -> (Self, JoinHandle<()>)
    where
        C: EntityCache + Send + Sync + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(cache, publisher, receiver));
        (Self { sender }, handle)
    }

    /// Queue an upsert without waiting for it; failures are only logged.
    pub fn enqueue_upsert(&self, entity: Entity) {
        let id = entity.id().clone();
        let command = WriteCommand::Upsert {
            entity: Box::new(entity),
            reply: None,
        };
        if self.sender.send(command).is_err() {
            tracing::warn!(entity_id = %id, "cache writer stopped, dropping update");
        }
    }

    /// Queue a batch upsert without waiting for it; failures are only logged.
    pub fn enqueue_upsert_all(&self, entities: Vec<Entity>) {
        let count = entities.len();
        let command = WriteCommand::UpsertAll {
            entities,
            reply: None,
        };
        if self.sender.send(command).is_err() {
            tracing::warn!(count, "cache writer stopped, dropping batch");
        }
    }

    /// Upsert and wait. Returns `false` when the entity was stale and skipped.
    ///
    /// # Errors
    ///
    /// Returns the cache's storage error, or [`HomeSyncError::Storage`] when
    /// the writer task is gone.
    pub async fn upsert(&self, entity: Entity) -> Result<bool, HomeSyncError> {
        self.request(|reply| WriteCommand::Upsert {
            entity: Box::new(entity),
            reply: Some(reply),
        })
        .await
    }

    /// Batch upsert in one transaction and wait. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns the cache's storage error, or [`HomeSyncError::Storage`] when
    /// the writer task is gone.
    pub async fn upsert_all(&self, entities: Vec<Entity>) -> Result<usize, HomeSyncError> {
        self.request(|reply| WriteCommand::UpsertAll {
            entities,
            reply: Some(reply),
        })
        .await
    }

    /// Remove every cached entity, after all writes queued before it.
    ///
    /// # Errors
    ///
    /// Returns the cache's storage error, or [`HomeSyncError::Storage`] when
    /// the writer task is gone.
    pub async fn reset(&self) -> Result<usize, HomeSyncError> {
        self.request(|reply| WriteCommand::Reset { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> WriteCommand,
    ) -> Result<T, HomeSyncError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .map_err(|_| HomeSyncError::Storage(Box::new(WriterStopped)))?;
        response
            .await
            .map_err(|_| HomeSyncError::Storage(Box::new(WriterStopped)))?
    }
}

async fn run<C, P>(cache: C, publisher: P, mut receiver: mpsc::UnboundedReceiver<WriteCommand>)
where
    C: EntityCache,
    P: EventPublisher,
{
    while let Some(command) = receiver.recv().await {
        match command {
            WriteCommand::Upsert { entity, reply } => {
                let result = apply_upsert(&cache, &publisher, *entity).await;
                respond(reply, result, "upsert");
            }
            WriteCommand::UpsertAll { entities, reply } => {
                let result = apply_upsert_all(&cache, &publisher, entities).await;
                respond(reply, result, "batch upsert");
            }
            WriteCommand::Reset { reply } => {
                let result = cache.reset().await;
                if let Ok(removed) = &result {
                    tracing::info!(removed, "cache reset");
                }
                respond(Some(reply), result, "reset");
            }
        }
    }
    tracing::debug!("cache writer stopped");
}

fn respond<T>(reply: Option<Reply<T>>, result: Result<T, HomeSyncError>, operation: &str) {
    match reply {
        Some(reply) => {
            // The caller may have stopped waiting; the write happened anyway.
            let _ = reply.send(result);
        }
        None => {
            if let Err(err) = result {
                tracing::warn!(error = %err.report(), operation, "cache write failed");
            }
        }
    }
}

async fn apply_upsert<C, P>(cache: &C, publisher: &P, entity: Entity) -> Result<bool, HomeSyncError>
where
    C: EntityCache,
    P: EventPublisher,
{
    if let Some(cached) = cache.get(entity.id()).await?
        && entity.is_older_than(&cached)
    {
        tracing::debug!(entity_id = %entity.id(), "skipping stale update");
        return Ok(false);
    }
    cache.upsert(&entity).await?;
    notify(publisher, entity).await;
    Ok(true)
}

async fn apply_upsert_all<C, P>(
    cache: &C,
    publisher: &P,
    entities: Vec<Entity>,
) -> Result<usize, HomeSyncError>
where
    C: EntityCache,
    P: EventPublisher,
{
    let cached: HashMap<EntityId, Entity> = cache
        .list()
        .await?
        .into_iter()
        .map(|entity| (entity.id().clone(), entity))
        .collect();
    let (fresh, stale): (Vec<Entity>, Vec<Entity>) = entities.into_iter().partition(|entity| {
        cached
            .get(entity.id())
            .is_none_or(|current| !entity.is_older_than(current))
    });
    if !stale.is_empty() {
        tracing::debug!(skipped = stale.len(), "skipping stale entities in batch");
    }
    let written = cache.upsert_all(&fresh).await?;
    for entity in fresh {
        notify(publisher, entity).await;
    }
    Ok(written)
}

async fn notify<P: EventPublisher>(publisher: &P, entity: Entity) {
    let id = entity.id().clone();
    if let Err(err) = publisher
        .publish(SyncNotification::EntityChanged(Arc::new(entity)))
        .await
    {
        tracing::warn!(error = %err.report(), entity_id = %id, "failed to publish entity change");
    }
}
