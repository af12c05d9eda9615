use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;
use zone_core::{CorrelationId, EntityId, ErrorCode, ZoneError};
use zone_geo::Coordinate;
use zone_registry::CollectionError;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: message.into(),
    })
}

pub fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: message.into(),
    })
}

pub fn conflict(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ErrorResponse {
        error: message.into(),
    })
}

pub fn internal_error(message: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: message.into(),
    })
}

pub fn error_response(code: ErrorCode, message: String) -> HttpResponse {
    match code {
        ErrorCode::InvalidInput => bad_request(message),
        ErrorCode::NotFound => not_found(message),
        ErrorCode::Conflict => conflict(message),
        ErrorCode::Internal => {
            error!(error = %message, "request failed");
            internal_error("internal error")
        }
    }
}

pub fn zone_error(err: &ZoneError) -> HttpResponse {
    error_response(err.code(), err.to_string())
}

pub fn collection_error(err: &CollectionError) -> HttpResponse {
    error_response(err.code(), err.to_string())
}

pub fn parse_entity_id(value: &str) -> Result<EntityId, HttpResponse> {
    match value.split_once('.') {
        Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => {
            Ok(EntityId::new(value))
        }
        _ => Err(bad_request("entity id must look like <domain>.<object_id>")),
    }
}

/// Optional correlation id carried onto the events a request publishes.
pub fn parse_correlation_id(req: &HttpRequest) -> Result<Option<CorrelationId>, HttpResponse> {
    let Some(value) = req.headers().get(CORRELATION_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .map(|uuid| Some(CorrelationId::from_uuid(uuid)))
        .ok_or_else(|| bad_request("invalid correlation id"))
}

pub fn parse_point(latitude: f64, longitude: f64, radius_m: f64) -> Result<Coordinate, HttpResponse> {
    let point = Coordinate::new(latitude, longitude);
    if !point.is_finite() {
        return Err(bad_request("latitude and longitude must be finite"));
    }
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(bad_request("radius must be a non-negative number"));
    }
    Ok(point)
}
