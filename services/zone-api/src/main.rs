mod routes;
mod state;

use actix_web::{App, HttpServer, web};
use std::io;
use tracing::{error, info, warn};
use zone_config::{HomeZoneConfig, ServiceConfig, StaticZoneConfig, TriggerConfig};
use zone_observability::{ObservabilityConfig, init, log_startup};
use zone_storage_json::JsonFileStore;
use zone_trigger::ZoneEntryTrigger;

use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = ServiceConfig::from_env("zone-api");
    let handle = init(&ObservabilityConfig::from_service(&config));
    log_startup(&handle);

    let home = HomeZoneConfig::from_env();
    if home.is_none() {
        warn!("ZONE_HOME_LATITUDE/ZONE_HOME_LONGITUDE not set, running without a home zone");
    }
    let static_zones = StaticZoneConfig::list_from_env().map_err(|err| {
        error!(error = %err, "invalid ZONE_STATIC_ZONES");
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;
    let store = Box::new(JsonFileStore::new(&config.data_dir));
    let state = AppState::bootstrap(config, store, home, static_zones).await.map_err(|err| {
        error!(error = %err, "failed to load zones");
        io::Error::other(err)
    })?;

    if let Some(trigger_config) = TriggerConfig::from_env() {
        let trigger = ZoneEntryTrigger::from_config(&trigger_config);
        actix_web::rt::spawn(trigger.run(
            state.bus.subscribe(),
            state.bus.clone(),
            state.registry.clone(),
        ));
    } else {
        info!("no zone entry trigger configured");
    }

    let bind_addr = state.config.bind_addr.clone();
    let shared_state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
