use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zone_core::{
    EntityId, ZONE_DOMAIN, Zone, ZoneAttributes, ZoneChange, ZoneChangeKind, ZoneCreate, ZoneError,
    ZoneId, ZoneState, ZoneUpdate,
};
use zone_observability::MutationOp;
use zone_registry::ZoneRegistry;

use crate::routes::common::{bad_request, collection_error, not_found, parse_entity_id, zone_error};
use crate::state::AppState;

/// A zone as exposed over HTTP: identity, availability and state attributes.
#[derive(Debug, Serialize)]
pub struct ZoneView {
    pub id: ZoneId,
    pub entity_id: EntityId,
    pub state: ZoneState,
    pub attributes: ZoneAttributes,
}

impl ZoneView {
    pub fn render(registry: &ZoneRegistry, zone: &Zone) -> Self {
        let occupants = registry.occupants(zone);
        Self {
            id: zone.id.clone(),
            entity_id: zone.entity_id(),
            state: zone.state,
            attributes: ZoneAttributes::render(zone, &occupants),
        }
    }
}

/// Flat state view: the attribute map other integrations consume.
#[derive(Debug, Serialize)]
pub struct ZoneStateView {
    pub entity_id: EntityId,
    pub state: ZoneState,
    pub attributes: Map<String, Value>,
}

/// A zone handed over by another integration as a state plus attributes.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneImport {
    pub entity_id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[get("/v1/zones")]
pub async fn list_zones(state: web::Data<AppState>) -> HttpResponse {
    let registry = state.registry.read().await;
    let zones: Vec<ZoneView> = registry
        .zones()
        .map(|zone| ZoneView::render(&registry, zone))
        .collect();
    HttpResponse::Ok().json(zones)
}

#[get("/v1/zones/{id}")]
pub async fn get_zone(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let registry = state.registry.read().await;
    match registry.get(&ZoneId::new(id.into_inner())) {
        Some(zone) => HttpResponse::Ok().json(ZoneView::render(&registry, zone)),
        None => not_found("zone not found"),
    }
}

#[get("/v1/zones/{id}/state")]
pub async fn get_zone_state(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let registry = state.registry.read().await;
    match registry.get(&ZoneId::new(id.into_inner())) {
        Some(zone) => {
            let occupants = registry.occupants(zone);
            HttpResponse::Ok().json(ZoneStateView {
                entity_id: zone.entity_id(),
                state: zone.state,
                attributes: ZoneAttributes::render(zone, &occupants).to_map(),
            })
        }
        None => not_found("zone not found"),
    }
}

/// Registers a read-only zone rebuilt from its state attributes. Imported
/// zones are not stored and cannot be edited.
#[post("/v1/zones/import")]
pub async fn import_zone(state: web::Data<AppState>, payload: web::Json<ZoneImport>) -> HttpResponse {
    let import = payload.into_inner();
    let entity_id = match parse_entity_id(&import.entity_id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    if entity_id.domain() != ZONE_DOMAIN {
        return bad_request("imported entities must be zones");
    }

    let mut zone = match Zone::from_attributes(
        ZoneId::new(entity_id.object_id()),
        &import.state,
        &import.attributes,
    ) {
        Ok(zone) => zone,
        Err(err) => return zone_error(&err),
    };
    zone.editable = false;

    let mut collection = state.collection.write().await;
    if let Err(err) = collection.reserve_external(&zone.id) {
        return zone_error(&err);
    }
    let change = ZoneChange {
        kind: ZoneChangeKind::Added,
        zone,
    };
    HttpResponse::Created().json(state.commit(change, MutationOp::Import).await)
}

#[post("/v1/zones")]
pub async fn create_zone(state: web::Data<AppState>, payload: web::Json<ZoneCreate>) -> HttpResponse {
    let mut collection = state.collection.write().await;
    match collection.create(payload.into_inner()).await {
        Ok(change) => HttpResponse::Created().json(state.commit(change, MutationOp::Create).await),
        Err(err) => collection_error(&err),
    }
}

#[patch("/v1/zones/{id}")]
pub async fn update_zone(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ZoneUpdate>,
) -> HttpResponse {
    let zone_id = ZoneId::new(id.into_inner());
    if let Err(response) = ensure_editable(&state, &zone_id).await {
        return response;
    }

    let mut collection = state.collection.write().await;
    match collection.update(&zone_id, payload.into_inner()).await {
        Ok(change) => HttpResponse::Ok().json(state.commit(change, MutationOp::Update).await),
        Err(err) => collection_error(&err),
    }
}

#[delete("/v1/zones/{id}")]
pub async fn delete_zone(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let zone_id = ZoneId::new(id.into_inner());
    if let Err(response) = ensure_editable(&state, &zone_id).await {
        return response;
    }

    let mut collection = state.collection.write().await;
    match collection.delete(&zone_id).await {
        Ok(change) => {
            state.commit(change, MutationOp::Delete).await;
            HttpResponse::NoContent().finish()
        }
        Err(err) => collection_error(&err),
    }
}

// Zones from static configuration are not part of the collection.
async fn ensure_editable(state: &AppState, id: &ZoneId) -> Result<(), HttpResponse> {
    let registry = state.registry.read().await;
    match registry.get(id) {
        Some(zone) if !zone.editable => Err(zone_error(&ZoneError::NotEditable(id.clone()))),
        _ => Ok(()),
    }
}
