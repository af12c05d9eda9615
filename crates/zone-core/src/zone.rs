//! Zone entity model: construction from validated documents and in-place
//! updates that keep the derived center in step with the shape.

use crate::error::{ZoneError, ZoneResult};
use crate::ids::{EntityId, IdManager, ZoneId};
use serde::{Deserialize, Serialize};
use std::fmt;
use zone_geo::{Coordinate, ZoneShape};

pub const ZONE_DOMAIN: &str = "zone";
pub const HOME_ZONE: &str = "home";
pub const ICON_HOME: &str = "mdi:home";
pub const DEFAULT_RADIUS_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneState {
    #[default]
    Available,
    Unavailable,
}

impl ZoneState {
    pub fn from_state(value: &str) -> Self {
        if value.eq_ignore_ascii_case("unavailable") {
            Self::Unavailable
        } else {
            Self::Available
        }
    }
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        };
        write!(f, "{}", value)
    }
}

/// Creation document for a stored polygon zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneCreate {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub passive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Circular zone from static configuration (the home zone and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub passive: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_M
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub passive: bool,
    pub icon: Option<String>,
    pub state: ZoneState,
    pub editable: bool,
    shape: ZoneShape,
    center: Coordinate,
}

impl Zone {
    /// Builds a zone with an already assigned id, deriving its center.
    pub fn new(
        id: ZoneId,
        name: String,
        shape: ZoneShape,
        passive: bool,
        icon: Option<String>,
        editable: bool,
    ) -> ZoneResult<Self> {
        let center = shape.center()?;
        Ok(Self {
            id,
            name,
            passive,
            icon,
            state: ZoneState::Available,
            editable,
            shape,
            center,
        })
    }

    /// Rebuilds a stored polygon zone under its persisted id.
    pub fn from_document(id: ZoneId, document: ZoneCreate) -> ZoneResult<Self> {
        let name = validate_name(&document.name)?;
        let icon = validate_icon(document.icon)?;
        let shape = polygon_shape(&document.points)?;
        Self::new(id, name, shape, document.passive, icon, true)
    }

    pub fn shape(&self) -> &ZoneShape {
        &self.shape
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn entity_id(&self) -> EntityId {
        EntityId::new(format!("{ZONE_DOMAIN}.{}", self.id))
    }

    pub fn is_home(&self) -> bool {
        self.id.as_str() == HOME_ZONE
    }

    pub fn points(&self) -> Option<Vec<[f64; 2]>> {
        self.shape
            .vertices()
            .map(|vertices| vertices.iter().map(|vertex| (*vertex).into()).collect())
    }

    /// Creation document equivalent of this zone; `None` for circles.
    pub fn to_document(&self) -> Option<ZoneCreate> {
        Some(ZoneCreate {
            name: self.name.clone(),
            points: self.points()?,
            passive: self.passive,
            icon: self.icon.clone(),
        })
    }

    /// Swaps the shape and recomputes the center. Leaves the zone untouched on error.
    pub fn set_shape(&mut self, shape: ZoneShape) -> ZoneResult<()> {
        let center = shape.center()?;
        self.shape = shape;
        self.center = center;
        Ok(())
    }
}

pub fn create_zone(input: ZoneCreate, ids: &mut IdManager) -> ZoneResult<Zone> {
    let name = validate_name(&input.name)?;
    let icon = validate_icon(input.icon)?;
    let shape = polygon_shape(&input.points)?;
    let id = ids.generate_id(&name);
    Zone::new(id, name, shape, input.passive, icon, true)
}

pub fn create_circle_zone(config: CircleZoneConfig, ids: &mut IdManager) -> ZoneResult<Zone> {
    let name = validate_name(&config.name)?;
    let icon = validate_icon(config.icon)?;
    let shape = ZoneShape::circle(Coordinate::new(config.latitude, config.longitude), config.radius)?;
    let id = ids.generate_id(&name);
    Zone::new(id, name, shape, config.passive, icon, false)
}

/// The configured home zone always takes the `home` id, whatever its name.
pub fn create_home_zone(config: CircleZoneConfig, ids: &mut IdManager) -> ZoneResult<Zone> {
    let name = validate_name(&config.name)?;
    let icon = validate_icon(config.icon)?.or_else(|| Some(ICON_HOME.to_string()));
    let shape = ZoneShape::circle(Coordinate::new(config.latitude, config.longitude), config.radius)?;
    let id = ZoneId::new(HOME_ZONE);
    ids.reserve(&id);
    Zone::new(id, name, shape, config.passive, icon, false)
}

/// Merges `patch` into a copy of `existing`. The id never changes.
pub fn update_zone(existing: &Zone, patch: ZoneUpdate) -> ZoneResult<Zone> {
    let mut updated = existing.clone();
    if let Some(name) = patch.name {
        updated.name = validate_name(&name)?;
    }
    if let Some(points) = patch.points {
        updated.set_shape(polygon_shape(&points)?)?;
    }
    if let Some(passive) = patch.passive {
        updated.passive = passive;
    }
    if patch.icon.is_some() {
        updated.icon = validate_icon(patch.icon)?;
    }
    Ok(updated)
}

fn polygon_shape(points: &[[f64; 2]]) -> ZoneResult<ZoneShape> {
    let vertices = points.iter().copied().map(Coordinate::from).collect();
    Ok(ZoneShape::polygon(vertices)?)
}

fn validate_name(name: &str) -> ZoneResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ZoneError::MissingName);
    }
    Ok(trimmed.to_string())
}

fn validate_icon(icon: Option<String>) -> ZoneResult<Option<String>> {
    let Some(icon) = icon else {
        return Ok(None);
    };
    match icon.split_once(':') {
        Some((prefix, name)) if !prefix.is_empty() && !name.is_empty() => Ok(Some(icon)),
        _ => Err(ZoneError::InvalidIcon(icon)),
    }
}
