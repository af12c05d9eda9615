use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use zone_config::{HomeZoneConfig, ServiceConfig, StaticZoneConfig};
use zone_core::{CircleZoneConfig, IdManager, ZoneChange, create_circle_zone, create_home_zone};
use zone_messaging::{BusEvent, EventBus};
use zone_observability::{MutationOp, record_mutation};
use zone_registry::{CollectionError, ZoneCollection, ZoneRegistry};
use zone_storage::ZoneStore;

use crate::routes::zones::ZoneView;

pub type SharedStore = Box<dyn ZoneStore>;

pub struct AppState {
    pub config: ServiceConfig,
    pub registry: Arc<RwLock<ZoneRegistry>>,
    pub collection: RwLock<ZoneCollection<SharedStore>>,
    pub bus: EventBus,
}

impl AppState {
    /// Registers the configured home and static zones, then loads stored
    /// zones around them.
    pub async fn bootstrap(
        config: ServiceConfig,
        store: SharedStore,
        home: Option<HomeZoneConfig>,
        static_zones: Vec<StaticZoneConfig>,
    ) -> Result<Self, CollectionError> {
        let mut ids = IdManager::new();
        let mut registry = ZoneRegistry::new();
        if let Some(home) = home {
            let zone = create_home_zone(
                CircleZoneConfig {
                    name: home.name,
                    latitude: home.latitude,
                    longitude: home.longitude,
                    radius: home.radius_m,
                    passive: home.passive,
                    icon: Some(home.icon),
                },
                &mut ids,
            )?;
            info!(zone_id = %zone.id, radius_m = home.radius_m, "home zone configured");
            registry.insert(zone);
        }
        for entry in static_zones {
            let zone = create_circle_zone(
                CircleZoneConfig {
                    name: entry.name,
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                    radius: entry.radius,
                    passive: entry.passive,
                    icon: entry.icon,
                },
                &mut ids,
            )?;
            info!(zone_id = %zone.id, radius_m = entry.radius, "static zone configured");
            registry.insert(zone);
        }

        let mut collection = ZoneCollection::new(store, ids);
        for change in collection.load().await? {
            registry.apply(&change);
        }

        let bus = EventBus::new(config.service_name.clone(), config.bus_capacity);
        Ok(Self {
            config,
            registry: Arc::new(RwLock::new(registry)),
            collection: RwLock::new(collection),
            bus,
        })
    }

    /// Mirrors a collection change into the registry and announces it.
    pub async fn commit(&self, change: ZoneChange, op: MutationOp) -> ZoneView {
        let view = {
            let mut registry = self.registry.write().await;
            registry.apply(&change);
            ZoneView::render(&registry, &change.zone)
        };
        record_mutation(op);
        self.bus.publish(BusEvent::ZoneChanged(change));
        view
    }
}
