//! State attributes published for each zone, and the reverse mapping used
//! when a zone arrives as a generic attribute bag from outside.

use crate::error::{ZoneError, ZoneResult};
use crate::ids::{EntityId, ZoneId};
use crate::zone::{Zone, ZoneState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zone_geo::{Coordinate, ZoneShape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    pub friendly_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
    pub passive: bool,
    pub persons: Vec<EntityId>,
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 2]>>,
}

impl ZoneAttributes {
    pub fn render<'a>(zone: &Zone, occupants: impl IntoIterator<Item = &'a EntityId>) -> Self {
        let mut persons: Vec<EntityId> = occupants.into_iter().cloned().collect();
        persons.sort();
        persons.dedup();
        let center = zone.center();
        Self {
            friendly_name: zone.name.clone(),
            icon: zone.icon.clone(),
            latitude: center.latitude,
            longitude: center.longitude,
            radius: zone.shape().display_radius(),
            passive: zone.passive,
            persons,
            editable: zone.editable,
            points: zone.points(),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl Zone {
    /// Rebuilds a zone from an external state (`state` string plus attribute map).
    ///
    /// A `points` attribute selects polygon evaluation. Circles need `latitude`
    /// and `longitude`; a missing or null `radius` yields a circle that never
    /// contains anything.
    pub fn from_attributes(id: ZoneId, state: &str, attributes: &Map<String, Value>) -> ZoneResult<Self> {
        let name = attributes
            .get("friendly_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string());
        let passive = attributes
            .get("passive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let editable = attributes
            .get("editable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let icon = attributes
            .get("icon")
            .and_then(Value::as_str)
            .map(str::to_string);

        let shape = match attributes.get("points") {
            Some(points) => {
                let points: Vec<[f64; 2]> = serde_json::from_value(points.clone()).map_err(|err| {
                    ZoneError::InvalidAttribute {
                        field: "points",
                        message: err.to_string(),
                    }
                })?;
                ZoneShape::polygon(points.into_iter().map(Coordinate::from).collect())?
            }
            None => {
                let latitude = coordinate_attribute(&id, attributes, "latitude")?;
                let longitude = coordinate_attribute(&id, attributes, "longitude")?;
                ZoneShape::Circle {
                    center: Coordinate::new(latitude, longitude),
                    radius_m: attributes.get("radius").and_then(Value::as_f64),
                }
            }
        };

        let mut zone = Zone::new(id, name, shape, passive, icon, editable)?;
        zone.state = ZoneState::from_state(state);
        Ok(zone)
    }
}

fn coordinate_attribute(
    id: &ZoneId,
    attributes: &Map<String, Value>,
    field: &'static str,
) -> ZoneResult<f64> {
    attributes
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ZoneError::MissingCoordinate {
            zone_id: id.clone(),
            field,
        })
}
