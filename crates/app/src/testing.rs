//! In-memory port implementations shared by the service tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

use serde_json::{Map, Value};

use homesync_domain::entity::{Domain, Entity};
use homesync_domain::error::{HomeSyncError, NotFoundError};
use homesync_domain::hub_config::HubConfig;
use homesync_domain::id::EntityId;
use homesync_domain::service::ServiceCall;

use crate::ports::{EntityCache, EventPublisher, HubApi, SyncNotification};

pub fn entity(id: &str, state: &str) -> Entity {
    Entity::builder().entity_id(id).state(state).build().unwrap()
}

pub fn entity_at(id: &str, state: &str, last_updated: &str) -> Entity {
    Entity::builder()
        .entity_id(id)
        .state(state)
        .last_updated(last_updated.parse().unwrap())
        .build()
        .unwrap()
}

#[derive(Default)]
pub struct InMemoryCache {
    store: Mutex<BTreeMap<EntityId, Entity>>,
}

impl InMemoryCache {
    pub fn with(entities: Vec<Entity>) -> Self {
        let cache = Self::default();
        {
            let mut store = cache.store.lock().unwrap();
            for entity in entities {
                store.insert(entity.id().clone(), entity);
            }
        }
        cache
    }

    pub fn snapshot(&self, id: &str) -> Option<Entity> {
        let id = EntityId::new(id).unwrap();
        self.store.lock().unwrap().get(&id).cloned()
    }
}

impl EntityCache for InMemoryCache {
    fn upsert(&self, entity: &Entity) -> impl Future<Output = Result<(), HomeSyncError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(entity.id().clone(), entity.clone());
        async { Ok(()) }
    }

    fn upsert_all(
        &self,
        entities: &[Entity],
    ) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        let mut store = self.store.lock().unwrap();
        for entity in entities {
            store.insert(entity.id().clone(), entity.clone());
        }
        let written = entities.len();
        async move { Ok(written) }
    }

    fn get(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HomeSyncError>> + Send {
        let result = self.store.lock().unwrap().get(id).cloned();
        async { Ok(result) }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        let result: Vec<Entity> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn list_by_domain(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        let result: Vec<Entity> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|entity| entity.domain() == domain)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn reset(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        let mut store = self.store.lock().unwrap();
        let removed = store.len();
        store.clear();
        async move { Ok(removed) }
    }

    fn count(&self) -> impl Future<Output = Result<usize, HomeSyncError>> + Send {
        let count = self.store.lock().unwrap().len();
        async move { Ok(count) }
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<SyncNotification>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<SyncNotification> {
        self.published.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(
        &self,
        notification: SyncNotification,
    ) -> impl Future<Output = Result<(), HomeSyncError>> + Send {
        self.published.lock().unwrap().push(notification);
        async { Ok(()) }
    }
}

/// Hub double serving a fixed state list and recording service calls.
#[derive(Default)]
pub struct FakeHubApi {
    pub states: Vec<Entity>,
    pub calls: Mutex<Vec<ServiceCall>>,
    pub events: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl FakeHubApi {
    pub fn with_states(states: Vec<Entity>) -> Self {
        Self {
            states,
            ..Self::default()
        }
    }
}

impl HubApi for FakeHubApi {
    fn get_config(&self) -> impl Future<Output = Result<HubConfig, HomeSyncError>> + Send {
        async { Ok(HubConfig::default()) }
    }

    fn get_states(&self) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        let states = self.states.clone();
        async { Ok(states) }
    }

    fn get_state(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Entity, HomeSyncError>> + Send {
        let found = self.states.iter().find(|entity| entity.id() == id).cloned();
        let id = id.to_string();
        async move {
            found.ok_or_else(|| {
                NotFoundError {
                    entity: "Entity",
                    id,
                }
                .into()
            })
        }
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<Vec<Entity>, HomeSyncError>> + Send {
        self.calls.lock().unwrap().push(call.clone());
        let changed: Vec<Entity> = call
            .data
            .get("entity_id")
            .and_then(Value::as_str)
            .and_then(|id| self.states.iter().find(|entity| entity.id().as_str() == id))
            .cloned()
            .into_iter()
            .collect();
        async { Ok(changed) }
    }

    fn fire_event(
        &self,
        event_type: &str,
        data: &Map<String, Value>,
    ) -> impl Future<Output = Result<String, HomeSyncError>> + Send {
        self.events
            .lock()
            .unwrap()
            .push((event_type.to_string(), data.clone()));
        let message = format!("Event {event_type} fired.");
        async { Ok(message) }
    }
}
