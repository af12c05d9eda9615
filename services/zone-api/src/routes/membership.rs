use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use zone_core::{ZoneId, presence_state};
use zone_observability::record_resolution;

use crate::routes::common::{parse_point, zone_error};
use crate::routes::zones::ZoneView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub radius: f64,
}

#[derive(Debug, Serialize)]
struct ContainsResponse {
    zone_id: ZoneId,
    contains: bool,
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    state: String,
    zone: Option<ZoneView>,
}

#[get("/v1/zones/{id}/contains")]
pub async fn zone_contains(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<PointQuery>,
) -> HttpResponse {
    let point = match parse_point(query.latitude, query.longitude, query.radius) {
        Ok(point) => point,
        Err(response) => return response,
    };
    let zone_id = ZoneId::new(id.into_inner());

    let registry = state.registry.read().await;
    match registry.contains(&zone_id, point, query.radius) {
        Ok(contains) => HttpResponse::Ok().json(ContainsResponse { zone_id, contains }),
        Err(err) => zone_error(&err),
    }
}

#[get("/v1/resolve")]
pub async fn resolve(state: web::Data<AppState>, query: web::Query<PointQuery>) -> HttpResponse {
    let point = match parse_point(query.latitude, query.longitude, query.radius) {
        Ok(point) => point,
        Err(response) => return response,
    };

    let registry = state.registry.read().await;
    let active = registry.active_zone(point, query.radius);
    record_resolution();
    HttpResponse::Ok().json(ResolveResponse {
        state: presence_state(active),
        zone: active.map(|zone| ZoneView::render(&registry, zone)),
    })
}
