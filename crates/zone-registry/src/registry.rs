use std::collections::BTreeMap;
use tracing::{debug, info};
use zone_core::{
    EntityId, EntityState, EntityStateChange, Location, STATE_UNKNOWN, ZONE_DOMAIN, Zone,
    ZoneAttributes, ZoneChange, ZoneChangeKind, ZoneError, ZoneId, ZoneResult, now_epoch_millis,
    occupies, presence_state,
};
use zone_geo::Coordinate;
use zone_membership::{ZoneSnapshot, is_in_zone, resolve_active_zone};

/// Current zones plus the last known state of every tracked entity.
///
/// Zones iterate in ascending id order. Occupancy is derived from entity
/// states on read, so it can never drift from them.
#[derive(Debug, Default, Clone)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, Zone>,
    entities: BTreeMap<EntityId, EntityState>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone: Zone) {
        self.zones.insert(zone.id.clone(), zone);
    }

    pub fn apply(&mut self, change: &ZoneChange) {
        match change.kind {
            ZoneChangeKind::Added | ZoneChangeKind::Updated => {
                info!(zone_id = %change.zone.id, kind = ?change.kind, "zone registered");
                self.insert(change.zone.clone());
            }
            ZoneChangeKind::Removed => {
                info!(zone_id = %change.zone.id, "zone removed");
                self.zones.remove(&change.zone.id);
            }
        }
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// Looks a zone up by entity id, e.g. `zone.home`.
    pub fn get_by_entity_id(&self, entity_id: &EntityId) -> Option<&Zone> {
        if entity_id.domain() != ZONE_DOMAIN {
            return None;
        }
        self.zones.get(&ZoneId::new(entity_id.object_id()))
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn active_zone(&self, point: Coordinate, radius_m: f64) -> Option<&Zone> {
        resolve_active_zone(self, point, radius_m)
    }

    pub fn contains(&self, id: &ZoneId, point: Coordinate, radius_m: f64) -> ZoneResult<bool> {
        let zone = self.get(id).ok_or_else(|| ZoneError::NotFound(id.clone()))?;
        Ok(is_in_zone(zone, point, radius_m))
    }

    pub fn occupants(&self, zone: &Zone) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|state| occupies(state, zone))
            .map(|state| state.entity_id.clone())
            .collect()
    }

    pub fn attributes(&self, id: &ZoneId) -> Option<ZoneAttributes> {
        let zone = self.get(id)?;
        let occupants = self.occupants(zone);
        Some(ZoneAttributes::render(zone, &occupants))
    }

    pub fn entity(&self, entity_id: &EntityId) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    /// Records a new location for `entity_id` and derives its presence state
    /// from the active zone. `None` means the position is unknown.
    pub fn update_entity(&mut self, entity_id: EntityId, location: Option<Location>) -> EntityStateChange {
        let state = match location {
            Some(location) => {
                let active = self.active_zone(location.coordinate(), location.gps_accuracy_m);
                presence_state(active)
            }
            None => STATE_UNKNOWN.to_string(),
        };
        debug!(entity_id = %entity_id, state = %state, "entity state updated");

        let new_state = EntityState {
            entity_id: entity_id.clone(),
            state,
            location,
            last_updated_ms: now_epoch_millis(),
        };
        let old_state = self.entities.insert(entity_id.clone(), new_state.clone());
        EntityStateChange {
            entity_id,
            old_state,
            new_state: Some(new_state),
        }
    }

    pub fn remove_entity(&mut self, entity_id: &EntityId) -> ZoneResult<EntityStateChange> {
        let old_state = self
            .entities
            .remove(entity_id)
            .ok_or_else(|| ZoneError::UnknownEntity(entity_id.clone()))?;
        Ok(EntityStateChange {
            entity_id: entity_id.clone(),
            old_state: Some(old_state),
            new_state: None,
        })
    }
}

impl ZoneSnapshot for ZoneRegistry {
    fn list_zones(&self) -> Vec<&Zone> {
        self.zones.values().collect()
    }
}
