pub mod common;
pub mod entities;
pub mod health;
pub mod membership;
pub mod sse;
pub mod status;
pub mod zones;

use actix_web::error::InternalError;
use actix_web::web;

use crate::routes::common::bad_request;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .service(health::health)
    .service(status::status)
    .service(zones::list_zones)
    .service(zones::import_zone)
    .service(zones::get_zone_state)
    .service(zones::get_zone)
    .service(zones::create_zone)
    .service(zones::update_zone)
    .service(zones::delete_zone)
    .service(membership::zone_contains)
    .service(membership::resolve)
    .service(entities::get_entity)
    .service(entities::update_location)
    .service(entities::remove_entity)
    .service(sse::sse);
}

#[cfg(test)]
mod tests;
