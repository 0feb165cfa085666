//! # homesync-adapter-http-reqwest
//!
//! Hub client using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `HubApi` port over the hub's REST API (`/api/...`)
//! - Implement the `EventSource` port over the server-sent event stream
//!   (`/api/stream`)
//! - Authenticate with a long-lived bearer token or the legacy API password
//!
//! ## Dependency rule
//! Depends on `homesync-app` (for port traits) and `homesync-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod client;
pub mod error;
pub mod sse;

pub use client::{Auth, HubClient};
pub use error::HttpError;
pub use sse::{SseEventSource, SseFrameDecoder};
