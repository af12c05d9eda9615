use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use zone_config::{HomeZoneConfig, ServiceConfig, StaticZoneConfig};
use zone_core::CorrelationId;
use zone_messaging::{BusEvent, BusReceiver};
use zone_storage::MemoryStore;
use zone_trigger::ZoneEntryTrigger;

use crate::routes::configure;
use crate::state::AppState;

async fn app_state() -> web::Data<AppState> {
    app_state_with(Vec::new()).await
}

async fn app_state_with(static_zones: Vec<StaticZoneConfig>) -> web::Data<AppState> {
    let config = ServiceConfig::from_source("zone-api", &HashMap::<String, String>::new());
    let home = HomeZoneConfig {
        name: "Home".to_string(),
        latitude: 40.0,
        longitude: -75.0,
        radius_m: 100.0,
        icon: "mdi:home".to_string(),
        passive: false,
    };
    let state = AppState::bootstrap(config, Box::new(MemoryStore::new()), Some(home), static_zones)
        .await
        .expect("bootstrap");
    web::Data::new(state)
}

fn office() -> StaticZoneConfig {
    StaticZoneConfig {
        name: "Office".to_string(),
        latitude: 40.5,
        longitude: -75.5,
        radius: 100.0,
        passive: false,
        icon: Some("mdi:briefcase".to_string()),
    }
}

async fn next_matching<T>(
    receiver: &mut BusReceiver,
    select: impl Fn(BusEvent) -> Option<T>,
) -> (T, Option<CorrelationId>) {
    actix_web::rt::time::timeout(Duration::from_secs(1), async {
        loop {
            let envelope = receiver.recv().await.expect("bus open");
            let correlation_id = envelope.metadata.correlation_id;
            if let Some(found) = select(envelope.payload) {
                return (found, correlation_id);
            }
        }
    })
    .await
    .expect("event in time")
}

fn park() -> Value {
    json!({
        "name": "Park",
        "points": [[41.0, -74.0], [41.0, -73.0], [42.0, -73.0], [42.0, -74.0]]
    })
}

#[actix_web::test]
async fn health_is_ok() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "zone-api");
}

#[actix_web::test]
async fn create_list_and_resolve_polygon_zone() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;

    let req = test::TestRequest::post().uri("/v1/zones").set_json(park()).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["id"], "park");
    assert_eq!(created["entity_id"], "zone.park");
    assert_eq!(created["attributes"]["latitude"], 41.5);
    assert_eq!(created["attributes"]["radius"], 0.0);
    assert_eq!(created["attributes"]["editable"], true);

    let req = test::TestRequest::get().uri("/v1/zones").to_request();
    let zones: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&str> = zones.iter().filter_map(|zone| zone["id"].as_str()).collect();
    assert_eq!(ids, vec!["home", "park"]);

    let req = test::TestRequest::get()
        .uri("/v1/resolve?latitude=41.5&longitude=-73.5")
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolved["state"], "Park");
    assert_eq!(resolved["zone"]["id"], "park");

    let req = test::TestRequest::get()
        .uri("/v1/resolve?latitude=0&longitude=0&radius=10")
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolved["state"], "not_home");
    assert!(resolved["zone"].is_null());
}

#[actix_web::test]
async fn invalid_polygon_is_rejected() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/v1/zones")
        .set_json(json!({"name": "Line", "points": [[0.0, 0.0], [1.0, 1.0]]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::post()
        .uri("/v1/zones")
        .set_json(json!({"name": "Park", "points": [[0.0, 0.0]], "radius": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn static_zone_cannot_be_changed() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::delete().uri("/v1/zones/home").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::patch()
        .uri("/v1/zones/home")
        .set_json(json!({"name": "Elsewhere"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::delete().uri("/v1/zones/nowhere").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_and_delete_polygon_zone() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::post().uri("/v1/zones").set_json(park()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::patch()
        .uri("/v1/zones/park")
        .set_json(json!({"passive": true}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["attributes"]["passive"], true);
    assert_eq!(updated["attributes"]["friendly_name"], "Park");

    let req = test::TestRequest::get()
        .uri("/v1/resolve?latitude=41.5&longitude=-73.5")
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resolved["zone"].is_null());

    let req = test::TestRequest::delete().uri("/v1/zones/park").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = test::TestRequest::get().uri("/v1/zones/park").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn contains_checks_a_single_zone() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::get()
        .uri("/v1/zones/home/contains?latitude=40.0005&longitude=-75.0")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["contains"], true);

    let req = test::TestRequest::get()
        .uri("/v1/zones/nowhere/contains?latitude=40&longitude=-75")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/v1/zones/home/contains?latitude=NaN&longitude=-75")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn location_update_sets_presence_and_occupancy() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/v1/entities/person.alice/location")
        .set_json(json!({"latitude": 40.0, "longitude": -75.0, "gps_accuracy_m": 10.0}))
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["state"], "home");

    let req = test::TestRequest::get().uri("/v1/zones/home").to_request();
    let home: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(home["attributes"]["persons"], json!(["person.alice"]));

    let req = test::TestRequest::post()
        .uri("/v1/entities/alice/location")
        .set_json(json!({"latitude": 40.0, "longitude": -75.0}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete().uri("/v1/entities/person.alice").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let req = test::TestRequest::delete().uri("/v1/entities/person.alice").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn location_update_drives_entry_trigger() {
    let state = app_state().await;
    let trigger = ZoneEntryTrigger::new(
        zone_core::EntityId::new("zone.home"),
        [zone_core::EntityId::new("person.alice")],
    );
    let mut entries = state.bus.subscribe();
    actix_web::rt::spawn(trigger.run(state.bus.subscribe(), state.bus.clone(), state.registry.clone()));

    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/v1/entities/person.alice/location")
        .set_json(json!({"latitude": 40.0, "longitude": -75.0}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let entered = actix_web::rt::time::timeout(Duration::from_secs(1), async {
        loop {
            let envelope = entries.recv().await.expect("bus open");
            if let BusEvent::ZoneEntered(entered) = envelope.payload {
                return entered;
            }
        }
    })
    .await
    .expect("entry event in time");
    assert_eq!(entered.entity_id.as_str(), "person.alice");
    assert_eq!(entered.zone_entity_id.as_str(), "zone.home");
}

#[actix_web::test]
async fn static_zones_resolve_but_cannot_be_changed() {
    let state = app_state_with(vec![office()]).await;
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let req = test::TestRequest::get().uri("/v1/zones/office").to_request();
    let zone: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(zone["attributes"]["editable"], false);
    assert_eq!(zone["attributes"]["icon"], "mdi:briefcase");

    let req = test::TestRequest::get()
        .uri("/v1/resolve?latitude=40.5&longitude=-75.5")
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolved["state"], "Office");

    let req = test::TestRequest::patch()
        .uri("/v1/zones/office")
        .set_json(json!({"name": "Moved"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/v1/zones")
        .set_json(json!({"name": "Office", "points": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["id"], "office_2");
}

#[actix_web::test]
async fn correlation_header_follows_the_update_into_entry_events() {
    let state = app_state().await;
    let trigger = ZoneEntryTrigger::new(
        zone_core::EntityId::new("zone.home"),
        [zone_core::EntityId::new("person.alice")],
    );
    let mut events = state.bus.subscribe();
    actix_web::rt::spawn(trigger.run(state.bus.subscribe(), state.bus.clone(), state.registry.clone()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let correlation_id = "6f1c0d2e-8a4b-4c3d-9e5f-0a1b2c3d4e5f";
    let req = test::TestRequest::post()
        .uri("/v1/entities/person.alice/location")
        .insert_header(("X-Correlation-Id", correlation_id))
        .set_json(json!({"latitude": 40.0, "longitude": -75.0}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let (_, changed) = next_matching(&mut events, |event| match event {
        BusEvent::EntityStateChanged(change) => Some(change),
        _ => None,
    })
    .await;
    let (_, entered) = next_matching(&mut events, |event| match event {
        BusEvent::ZoneEntered(entered) => Some(entered),
        _ => None,
    })
    .await;
    assert_eq!(changed.map(|id| id.to_string()).as_deref(), Some(correlation_id));
    assert_eq!(entered.map(|id| id.to_string()).as_deref(), Some(correlation_id));
}

#[actix_web::test]
async fn malformed_correlation_header_is_rejected() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/v1/entities/person.alice/location")
        .insert_header(("X-Correlation-Id", "not-a-uuid"))
        .set_json(json!({"latitude": 40.0, "longitude": -75.0}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/v1/entities/person.alice").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn zone_state_exposes_flat_attributes() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::get().uri("/v1/zones/home/state").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["entity_id"], "zone.home");
    assert_eq!(body["state"], "available");
    assert_eq!(body["attributes"]["friendly_name"], "Home");
    assert_eq!(body["attributes"]["latitude"], 40.0);
    assert_eq!(body["attributes"]["radius"], 100.0);
    assert!(body["attributes"].get("points").is_none());

    let req = test::TestRequest::get().uri("/v1/zones/nowhere/state").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn imported_zone_is_read_only_and_resolves() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let import = json!({
        "entity_id": "zone.office",
        "state": "available",
        "attributes": {
            "friendly_name": "Office",
            "latitude": 40.5,
            "longitude": -75.5,
            "radius": 100.0,
            "editable": true
        }
    });
    let req = test::TestRequest::post().uri("/v1/zones/import").set_json(&import).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["id"], "office");
    assert_eq!(created["attributes"]["editable"], false);

    let req = test::TestRequest::get()
        .uri("/v1/resolve?latitude=40.5&longitude=-75.5")
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolved["state"], "Office");

    let req = test::TestRequest::delete().uri("/v1/zones/office").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post().uri("/v1/zones/import").set_json(&import).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn polygon_state_can_be_imported_under_another_id() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let req = test::TestRequest::post().uri("/v1/zones").set_json(park()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/v1/zones/park/state").to_request();
    let exported: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/v1/zones/import")
        .set_json(json!({
            "entity_id": "zone.park_mirror",
            "state": exported["state"],
            "attributes": exported["attributes"]
        }))
        .to_request();
    let imported: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(imported["id"], "park_mirror");
    assert_eq!(imported["attributes"]["points"], exported["attributes"]["points"]);
    assert_eq!(imported["attributes"]["friendly_name"], "Park");
}

#[actix_web::test]
async fn import_rejects_bad_entities_and_missing_coordinates() {
    let app = test::init_service(App::new().app_data(app_state().await).configure(configure)).await;
    let cases = [
        json!({"entity_id": "zone.broken", "attributes": {"longitude": -75.0, "radius": 10.0}}),
        json!({"entity_id": "person.alice", "attributes": {"latitude": 1.0, "longitude": 1.0}}),
        json!({"entity_id": "office", "attributes": {"latitude": 1.0, "longitude": 1.0}}),
        json!({"entity_id": "zone.line", "attributes": {"points": [[0.0, 0.0], [1.0, 1.0]]}}),
    ];
    for case in cases {
        let req = test::TestRequest::post().uri("/v1/zones/import").set_json(&case).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{case}");
    }

    let req = test::TestRequest::post()
        .uri("/v1/zones/import")
        .set_json(json!({"entity_id": "zone.home", "attributes": {"latitude": 1.0, "longitude": 1.0}}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}
