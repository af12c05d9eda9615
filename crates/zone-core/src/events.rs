use crate::ids::EntityId;
use crate::presence::EntityState;
use crate::zone::Zone;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneChangeKind {
    Added,
    Updated,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneChange {
    pub kind: ZoneChangeKind,
    pub zone: Zone,
}

/// Old and new state of a tracked entity. `new_state` is `None` when the
/// entity went away.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStateChange {
    pub entity_id: EntityId,
    pub old_state: Option<EntityState>,
    pub new_state: Option<EntityState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneEntered {
    pub entity_id: EntityId,
    pub zone_entity_id: EntityId,
}
