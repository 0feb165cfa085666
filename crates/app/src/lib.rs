//! # homesync-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityCache` — local, persistent entity store keyed by entity id
//!   - `HubApi` — the hub's REST API
//!   - `EventSource` — the hub's server-push event stream
//!   - `EventPublisher` — sync notifications for observers
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SyncDriver` — consume the stream, keep the cache current, reconnect
//!   - `CacheWriter` — the single writer of the cache
//!   - `EntityService` — read entities back from the cache
//!   - `CommandService` — execute URL commands against the hub
//! - Provide **in-process infrastructure** (notification bus, backoff policy,
//!   connection state machine) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homesync-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod backoff;
pub mod connection;
pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
