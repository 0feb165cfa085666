//! # homesync-adapter-storage-sqlite-sqlx
//!
//! `SQLite` entity cache using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `EntityCache` port defined in `homesync-app::ports::cache`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `homesync-app` (for port traits) and `homesync-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod entity_cache;
pub mod error;
pub mod pool;

pub use entity_cache::SqliteEntityCache;
pub use pool::{Config, Database};
