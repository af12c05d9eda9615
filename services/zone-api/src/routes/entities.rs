use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use zone_core::{CorrelationId, Location, ZONE_DOMAIN};
use zone_messaging::{BusEvent, EventBus};
use zone_observability::{record_location_update, record_resolution};

use crate::routes::common::{
    bad_request, not_found, parse_correlation_id, parse_entity_id, parse_point, zone_error,
};
use crate::state::AppState;

#[get("/v1/entities/{entity_id}")]
pub async fn get_entity(state: web::Data<AppState>, entity_id: web::Path<String>) -> HttpResponse {
    let entity_id = match parse_entity_id(&entity_id) {
        Ok(value) => value,
        Err(response) => return response,
    };

    match state.registry.read().await.entity(&entity_id) {
        Some(entity) => HttpResponse::Ok().json(entity),
        None => not_found("entity not found"),
    }
}

#[post("/v1/entities/{entity_id}/location")]
pub async fn update_location(
    req: HttpRequest,
    state: web::Data<AppState>,
    entity_id: web::Path<String>,
    payload: web::Json<Location>,
) -> HttpResponse {
    let entity_id = match parse_entity_id(&entity_id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let correlation_id = match parse_correlation_id(&req) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let location = payload.into_inner();
    if let Err(response) = parse_point(location.latitude, location.longitude, location.gps_accuracy_m) {
        return response;
    }
    if entity_id.domain() == ZONE_DOMAIN {
        return bad_request("zones cannot be tracked");
    }

    let change = state.registry.write().await.update_entity(entity_id, Some(location));
    record_location_update();
    record_resolution();

    let new_state = change.new_state.clone();
    publish(&state.bus, BusEvent::EntityStateChanged(change), correlation_id);
    HttpResponse::Ok().json(new_state)
}

#[delete("/v1/entities/{entity_id}")]
pub async fn remove_entity(
    req: HttpRequest,
    state: web::Data<AppState>,
    entity_id: web::Path<String>,
) -> HttpResponse {
    let entity_id = match parse_entity_id(&entity_id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let correlation_id = match parse_correlation_id(&req) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let removed = state.registry.write().await.remove_entity(&entity_id);
    match removed {
        Ok(change) => {
            publish(&state.bus, BusEvent::EntityStateChanged(change), correlation_id);
            HttpResponse::NoContent().finish()
        }
        Err(err) => zone_error(&err),
    }
}

fn publish(bus: &EventBus, event: BusEvent, correlation_id: Option<CorrelationId>) {
    match correlation_id {
        Some(correlation_id) => bus.publish_correlated(event, correlation_id),
        None => bus.publish(event),
    };
}
