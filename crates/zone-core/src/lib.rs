pub mod attributes;
pub mod error;
pub mod events;
pub mod ids;
pub mod presence;
pub mod zone;

pub use attributes::ZoneAttributes;
pub use error::{ErrorCode, ZoneError, ZoneResult};
pub use events::{EntityStateChange, ZoneChange, ZoneChangeKind, ZoneEntered};
pub use ids::{CorrelationId, EntityId, IdManager, MessageId, ZoneId, slugify};
pub use presence::{
    EntityState, EpochMillis, Location, STATE_HOME, STATE_NOT_HOME, STATE_UNAVAILABLE,
    STATE_UNKNOWN, now_epoch_millis, occupies, presence_state,
};
pub use zone::{
    CircleZoneConfig, DEFAULT_RADIUS_M, HOME_ZONE, ICON_HOME, ZONE_DOMAIN, Zone, ZoneCreate,
    ZoneState, ZoneUpdate, create_circle_zone, create_home_zone, create_zone, update_zone,
};
