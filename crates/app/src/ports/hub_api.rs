//! Hub REST API port.

use std::future::Future;

use serde_json::{Map, Value};

use homesync_domain::entity::Entity;
use homesync_domain::error::HomeSyncError;
use homesync_domain::hub_config::HubConfig;
use homesync_domain::id::EntityId;
use homesync_domain::service::ServiceCall;

/// Request/response operations against the hub.
///
/// Failures to reach the hub, and non-success responses, surface as
/// [`HomeSyncError::Transport`]; payloads that cannot be decoded as
/// [`HomeSyncError::Decode`].
pub trait HubApi {
    fn get_config(&self) -> impl Future<Output = Result<HubConfig, HomeSyncError>> + Send;

    /// Full state of every entity.
    fn get_states(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send;

    /// State of a single entity; [`HomeSyncError::NotFound`] when unknown.
    fn get_state(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Entity, HomeSyncError>> + Send;

    /// Call a service. Returns the entities whose state changed as a result.
    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send;

    /// Fire a custom event. Returns the hub's confirmation message.
    fn fire_event(
        &self,
        event_type: &str,
        data: &Map<String, Value>,
    ) -> impl Future<Output = Result<String, HomeSyncError>> + Send;
}

impl<T: HubApi + Send + Sync> HubApi for std::sync::Arc<T> {
    fn get_config(&self) -> impl Future<Output = Result<HubConfig, HomeSyncError>> + Send {
        (**self).get_config()
    }

    fn get_states(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        (**self).get_states()
    }

    fn get_state(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Entity, HomeSyncError>> + Send {
        (**self).get_state(id)
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        (**self).call_service(call)
    }

    fn fire_event(
        &self,
        event_type: &str,
        data: &Map<String, Value>,
    ) -> impl Future<Output = Result<String, HomeSyncError>> + Send {
        (**self).fire_event(event_type, data)
    }
}
