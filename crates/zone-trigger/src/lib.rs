//! Fires a `zone_entered` event when a watched tracker moves into a zone.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zone_config::TriggerConfig;
use zone_core::{EntityId, EntityState, EntityStateChange, Zone, ZoneEntered};
use zone_membership::is_in_zone;
use zone_messaging::{BusError, BusEvent, BusReceiver, EventBus};
use zone_observability::record_zone_entered;
use zone_registry::ZoneRegistry;

#[derive(Debug, Clone)]
pub struct ZoneEntryTrigger {
    zone: EntityId,
    trackers: BTreeSet<EntityId>,
}

impl ZoneEntryTrigger {
    pub fn new(zone: EntityId, trackers: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            zone,
            trackers: trackers.into_iter().collect(),
        }
    }

    pub fn from_config(config: &TriggerConfig) -> Self {
        Self::new(
            EntityId::new(config.zone.clone()),
            config.trackers.iter().map(EntityId::new),
        )
    }

    pub fn zone_entity_id(&self) -> &EntityId {
        &self.zone
    }

    pub fn watches(&self, entity_id: &EntityId) -> bool {
        self.trackers.contains(entity_id)
    }

    /// Returns an event when `change` moves a watched tracker from outside
    /// `zone` to inside it. Both states are checked against the zone as it
    /// is now. An entity appearing for the first time inside the zone counts
    /// as an entry; leaving never fires.
    pub fn evaluate(&self, change: &EntityStateChange, zone: Option<&Zone>) -> Option<ZoneEntered> {
        if !self.watches(&change.entity_id) {
            return None;
        }
        let zone = zone?;
        let new_state = change.new_state.as_ref()?;

        let was_inside = change
            .old_state
            .as_ref()
            .is_some_and(|state| inside(state, zone));
        if was_inside || !inside(new_state, zone) {
            return None;
        }

        Some(ZoneEntered {
            entity_id: change.entity_id.clone(),
            zone_entity_id: self.zone.clone(),
        })
    }

    /// Consumes entity state changes from `events` until the bus closes,
    /// publishing every entry on `publisher`.
    pub async fn run(self, mut events: BusReceiver, publisher: EventBus, registry: Arc<RwLock<ZoneRegistry>>) {
        info!(zone = %self.zone, trackers = self.trackers.len(), "zone entry trigger started");
        loop {
            match events.recv().await {
                Ok(envelope) => {
                    let BusEvent::EntityStateChanged(change) = envelope.payload else {
                        continue;
                    };
                    let entered = {
                        let registry = registry.read().await;
                        self.evaluate(&change, registry.get_by_entity_id(&self.zone))
                    };
                    if let Some(entered) = entered {
                        info!(
                            entity_id = %entered.entity_id,
                            zone = %entered.zone_entity_id,
                            "zone entered"
                        );
                        record_zone_entered();
                        let event = BusEvent::ZoneEntered(entered);
                        match envelope.metadata.correlation_id {
                            Some(correlation_id) => publisher.publish_correlated(event, correlation_id),
                            None => publisher.publish(event),
                        };
                    } else {
                        debug!(entity_id = %change.entity_id, "state change did not enter zone");
                    }
                }
                Err(BusError::Lagged(skipped)) => {
                    warn!(skipped, "zone entry trigger lagged");
                }
                Err(BusError::Closed) => {
                    info!("event bus closed");
                    break;
                }
            }
        }
        info!(zone = %self.zone, "zone entry trigger stopped");
    }
}

// Only the reported position counts; GPS accuracy does not widen the zone.
fn inside(state: &EntityState, zone: &Zone) -> bool {
    state
        .location
        .is_some_and(|location| is_in_zone(zone, location.coordinate(), 0.0))
}
