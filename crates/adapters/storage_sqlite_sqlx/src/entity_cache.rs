//! `SQLite` implementation of [`EntityCache`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homesync_app::ports::EntityCache;
use homesync_domain::entity::{Attributes, Domain, Entity};
use homesync_domain::error::HomeSyncError;
use homesync_domain::id::EntityId;
use homesync_domain::time::{Timestamp, TimestampTransform};

use crate::error::StorageError;

/// Raw `entities` row. Turned into an [`Entity`] with the cache's
/// [`TimestampTransform`], since typed details may embed hub timestamps.
struct EntityRow {
    entity_id: String,
    state: String,
    attributes: String,
    last_changed: Option<String>,
    last_updated: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for EntityRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            entity_id: row.try_get("entity_id")?,
            state: row.try_get("state")?,
            attributes: row.try_get("attributes")?,
            last_changed: row.try_get("last_changed")?,
            last_updated: row.try_get("last_updated")?,
        })
    }
}

impl EntityRow {
    fn into_entity(self, timestamps: TimestampTransform) -> Result<Entity, StorageError> {
        let attributes: Attributes = serde_json::from_str(&self.attributes)?;
        let mut builder = Entity::builder()
            .entity_id(self.entity_id.as_str())
            .state(self.state)
            .attributes(attributes)
            .timestamps(timestamps);
        if let Some(ts) = parse_timestamp(&self.entity_id, self.last_changed.as_deref())? {
            builder = builder.last_changed(ts);
        }
        if let Some(ts) = parse_timestamp(&self.entity_id, self.last_updated.as_deref())? {
            builder = builder.last_updated(ts);
        }
        builder.build().map_err(|err| StorageError::InvalidRow {
            entity_id: self.entity_id,
            source: Box::new(err),
        })
    }
}

fn parse_timestamp(entity_id: &str, raw: Option<&str>) -> Result<Option<Timestamp>, StorageError> {
    raw.map(|raw| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.to_utc())
            .map_err(|err| StorageError::InvalidRow {
                entity_id: entity_id.to_string(),
                source: Box::new(err),
            })
    })
    .transpose()
}

const UPSERT: &str = r"
    INSERT INTO entities (entity_id, domain, state, attributes, last_changed, last_updated)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT (entity_id) DO UPDATE
    SET domain = excluded.domain, state = excluded.state, attributes = excluded.attributes,
        last_changed = excluded.last_changed, last_updated = excluded.last_updated
";

const SELECT_BY_ID: &str = "SELECT * FROM entities WHERE entity_id = ?";
const SELECT_ALL: &str = "SELECT * FROM entities ORDER BY entity_id";
const SELECT_BY_DOMAIN: &str = "SELECT * FROM entities WHERE domain = ? ORDER BY entity_id";
const COUNT: &str = "SELECT COUNT(*) FROM entities";
const DELETE_ALL: &str = "DELETE FROM entities";

/// `SQLite`-backed entity cache.
pub struct SqliteEntityCache {
    pool: SqlitePool,
    timestamps: TimestampTransform,
}

impl SqliteEntityCache {
    /// Create a new cache using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            timestamps: TimestampTransform::default(),
        }
    }

    /// Rebuild entities with the hub's timestamp transform.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: TimestampTransform) -> Self {
        self.timestamps = timestamps;
        self
    }

    fn decode_all(&self, rows: Vec<EntityRow>) -> Result<Vec<Entity>, HomeSyncError> {
        rows.into_iter()
            .map(|row| row.into_entity(self.timestamps).map_err(HomeSyncError::from))
            .collect()
    }
}

async fn upsert_one<'e, E>(executor: E, entity: &Entity) -> Result<(), StorageError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let attributes_json = serde_json::to_string(entity.attributes())?;

    sqlx::query(UPSERT)
        .bind(entity.id().as_str())
        .bind(entity.domain().as_str())
        .bind(entity.state())
        .bind(attributes_json)
        .bind(entity.last_changed().map(|ts| ts.to_rfc3339()))
        .bind(entity.last_updated().map(|ts| ts.to_rfc3339()))
        .execute(executor)
        .await?;

    Ok(())
}

impl EntityCache for SqliteEntityCache {
    async fn upsert(&self, entity: &Entity) -> Result<(), HomeSyncError> {
        upsert_one(&self.pool, entity).await?;
        Ok(())
    }

    async fn upsert_all(&self, entities: &[Entity]) -> Result<usize, HomeSyncError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for entity in entities {
            upsert_one(&mut *tx, entity).await?;
        }
        tx.commit().await.map_err(StorageError::from)?;

        Ok(entities.len())
    }

    async fn get(&self, id: &EntityId) -> Result<Option<Entity>, HomeSyncError> {
        let row: Option<EntityRow> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row
            .map(|row| row.into_entity(self.timestamps))
            .transpose()?)
    }

    async fn list(&self) -> Result<Vec<Entity>, HomeSyncError> {
        let rows: Vec<EntityRow> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        self.decode_all(rows)
    }

    async fn list_by_domain(&self, domain: &Domain) -> Result<Vec<Entity>, HomeSyncError> {
        let rows: Vec<EntityRow> = sqlx::query_as(SELECT_BY_DOMAIN)
            .bind(domain.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        self.decode_all(rows)
    }

    async fn reset(&self) -> Result<usize, HomeSyncError> {
        let result = sqlx::query(DELETE_ALL)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn count(&self) -> Result<usize, HomeSyncError> {
        let count: i64 = sqlx::query_scalar(COUNT)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(usize::try_from(count).unwrap_or_default())
    }
}
