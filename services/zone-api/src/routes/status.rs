use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use zone_core::{EpochMillis, now_epoch_millis};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct StatusResponse {
    service: String,
    environment: String,
    region: Option<String>,
    zones: usize,
    subscribers: usize,
    timestamp_ms: EpochMillis,
}

#[get("/v1/status")]
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let zones = state.registry.read().await.len();
    let response = StatusResponse {
        service: state.config.service_name.clone(),
        environment: state.config.environment.to_string(),
        region: state.config.region.clone(),
        zones,
        subscribers: state.bus.subscriber_count(),
        timestamp_ms: now_epoch_millis(),
    };

    HttpResponse::Ok().json(response)
}
