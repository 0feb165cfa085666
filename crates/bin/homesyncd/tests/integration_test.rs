//! End-to-end smoke tests for the full homesyncd stack.
//!
//! Each test wires the complete application (in-memory `SQLite`, real cache,
//! real services, real reqwest client) against a wiremock hub. No real hub
//! is contacted.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homesync_adapter_http_reqwest::{Auth, HubClient};
use homesync_adapter_storage_sqlite_sqlx::{Config, SqliteEntityCache};
use homesync_app::backoff::BackoffPolicy;
use homesync_app::event_bus::InProcessEventBus;
use homesync_app::ports::EntityCache;
use homesync_app::services::cache_writer::CacheWriter;
use homesync_app::services::command_service::{CommandOutcome, CommandService};
use homesync_app::services::entity_service::EntityService;
use homesync_app::services::sync_driver::{SyncDriver, SyncOptions};
use homesync_domain::entity::{Domain, EntityDetails};
use homesync_domain::id::EntityId;
use homesync_domain::time::TimestampTransform;

async fn cache() -> Arc<SqliteEntityCache> {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    Arc::new(db.entity_cache())
}

async fn hub() -> (MockServer, HubClient) {
    let server = MockServer::start().await;
    let client = HubClient::new(&server.uri(), &Auth::Bearer("token".to_string()))
        .expect("mock server URI should be valid");
    (server, client)
}

fn sse(frames: &[serde_json::Value]) -> String {
    let mut body = String::from("data: ping\n\n");
    for frame in frames {
        body.push_str(&format!("data: {frame}\n\n"));
    }
    body
}

fn options(refresh_on_open: bool) -> SyncOptions {
    SyncOptions {
        backoff: BackoffPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            ..BackoffPolicy::default()
        },
        refresh_on_open,
        timestamps: TimestampTransform::default(),
    }
}

/// Poll the cache until `id` holds `state`, or give up after a few seconds.
async fn wait_for_state(cache: &SqliteEntityCache, id: &str, state: &str) {
    let id = EntityId::new(id).unwrap();
    for _ in 0..200 {
        if let Some(entity) = cache.get(&id).await.unwrap()
            && entity.state() == state
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{id} never reached state {state}");
}

#[tokio::test]
async fn should_apply_streamed_state_change_to_cache() {
    let (server, client) = hub().await;
    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse(&[json!({
                    "event_type": "state_changed",
                    "time_fired": "2024-01-01T10:00:00.000000+00:00",
                    "origin": "LOCAL",
                    "data": {
                        "entity_id": "lock.front_door",
                        "old_state": {"entity_id": "lock.front_door", "state": "unlocked"},
                        "new_state": {
                            "entity_id": "lock.front_door",
                            "state": "locked",
                            "attributes": {"friendly_name": "Front Door"}
                        }
                    }
                })])),
        )
        .mount(&server)
        .await;

    let cache = cache().await;
    let bus = Arc::new(InProcessEventBus::new(64));
    let (writer, writer_task) = CacheWriter::spawn(Arc::clone(&cache), Arc::clone(&bus));
    let mut driver = SyncDriver::new(
        client.event_source(),
        client,
        Arc::clone(&bus),
        writer,
        options(false),
    );
    let cancel = CancellationToken::new();
    let run = tokio::spawn({
        let cancel = cancel.clone();
        async move { driver.run(cancel).await }
    });

    wait_for_state(&cache, "lock.front_door", "locked").await;
    cancel.cancel();
    run.await.unwrap().unwrap();
    writer_task.await.unwrap();

    let entity = cache
        .get(&EntityId::new("lock.front_door").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entity.name(), "Front Door");
    assert!(matches!(entity.details(), EntityDetails::Lock(lock) if lock.is_locked));
}

#[tokio::test]
async fn should_refresh_full_state_when_stream_opens() {
    let (server, client) = hub().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "entity_id": "device_tracker.phone",
                "state": "not_home",
                "attributes": {"latitude": 40.0, "longitude": -75.0}
            },
            {"entity_id": "group.all_lights", "state": "on", "attributes": {"entity_id": ["light.a", "light.b"]}},
            {"entity_id": "light.a", "state": "on"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse(&[])))
        .mount(&server)
        .await;

    let cache = cache().await;
    let bus = Arc::new(InProcessEventBus::new(64));
    let (writer, writer_task) = CacheWriter::spawn(Arc::clone(&cache), Arc::clone(&bus));
    let mut driver = SyncDriver::new(
        client.event_source(),
        client,
        Arc::clone(&bus),
        writer,
        options(true),
    );
    let cancel = CancellationToken::new();
    let run = tokio::spawn({
        let cancel = cancel.clone();
        async move { driver.run(cancel).await }
    });

    wait_for_state(&cache, "light.a", "on").await;
    cancel.cancel();
    run.await.unwrap().unwrap();
    writer_task.await.unwrap();

    let service = EntityService::new(Arc::clone(&cache));
    let tracker = service
        .get_entity(&EntityId::new("device_tracker.phone").unwrap())
        .await
        .unwrap();
    let EntityDetails::DeviceTracker(details) = tracker.details() else {
        panic!("expected device tracker details, got {:?}", tracker.details());
    };
    let coordinate = details.coordinate().unwrap();
    assert_eq!((coordinate.latitude, coordinate.longitude), (40.0, -75.0));

    let groups = service.list_by_domain(&Domain::Group).await.unwrap();
    let members = service.resolve_members(&groups[0]).await.unwrap();
    let states: Vec<&str> = members.iter().map(|member| member.state()).collect();
    assert_eq!(states, vec!["on", "unknown"]);
}

#[tokio::test]
async fn should_cache_entities_changed_by_url_command() {
    let (server, client) = hub().await;
    Mock::given(method("POST"))
        .and(path("/api/services/switch/turn_on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"entity_id": "switch.porch", "state": "on"}
        ])))
        .mount(&server)
        .await;

    let cache = cache().await;
    let (writer, writer_task) =
        CacheWriter::spawn(Arc::clone(&cache), InProcessEventBus::new(16));
    let service = CommandService::new(client, "phone", None).with_writer(writer);

    let outcome = service
        .open_url("homeassistant://call_service/switch.turn_on?entity_id=switch.porch")
        .await
        .unwrap();
    drop(service);
    writer_task.await.unwrap();

    assert!(matches!(outcome, CommandOutcome::ServiceCalled { ref changed } if changed.len() == 1));
    assert_eq!(cache.count().await.unwrap(), 1);
}
