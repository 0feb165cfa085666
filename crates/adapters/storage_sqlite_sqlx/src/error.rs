//! Storage-specific error type wrapping sqlx errors.

use homesync_domain::error::HomeSyncError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize stored attributes.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row no longer describes a valid entity.
    #[error("invalid stored entity {entity_id}")]
    InvalidRow {
        entity_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<StorageError> for HomeSyncError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
