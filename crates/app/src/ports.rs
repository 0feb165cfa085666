//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod cache;
pub mod event_bus;
pub mod event_source;
pub mod hub_api;

pub use cache::EntityCache;
pub use event_bus::{EventPublisher, SyncNotification};
pub use event_source::{EventSource, FrameStream};
pub use hub_api::HubApi;
