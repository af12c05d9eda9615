use crate::ids::EntityId;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use zone_geo::Coordinate;

pub const STATE_HOME: &str = "home";
pub const STATE_NOT_HOME: &str = "not_home";
pub const STATE_UNKNOWN: &str = "unknown";
pub const STATE_UNAVAILABLE: &str = "unavailable";

pub type EpochMillis = u64;

pub fn now_epoch_millis() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as EpochMillis)
        .unwrap_or_default()
}

/// Reported position of a tracked entity. The accuracy doubles as the
/// search radius when resolving the active zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub gps_accuracy_m: f64,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: EntityId,
    pub state: String,
    pub location: Option<Location>,
    pub last_updated_ms: EpochMillis,
}

/// State string for an entity whose active zone is `zone`.
pub fn presence_state(zone: Option<&Zone>) -> String {
    match zone {
        Some(zone) if zone.is_home() => STATE_HOME.to_string(),
        Some(zone) => zone.name.clone(),
        None => STATE_NOT_HOME.to_string(),
    }
}

/// Whether an entity in `state` counts as an occupant of `zone`.
pub fn occupies(state: &EntityState, zone: &Zone) -> bool {
    let value = state.state.as_str();
    if matches!(value, STATE_NOT_HOME | STATE_UNKNOWN | STATE_UNAVAILABLE) {
        return false;
    }
    value.to_lowercase() == zone.name.to_lowercase() || (value == STATE_HOME && zone.is_home())
}
