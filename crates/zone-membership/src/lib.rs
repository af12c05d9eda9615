//! Zone membership: single-zone containment and active-zone resolution.
//!
//! Both entry points are pure functions of their inputs. Zones are assumed to
//! have been validated when they were created; a zone whose data is unusable
//! at query time is logged and treated as "not contained" so that it can never
//! abort a scan over the others.

use std::collections::BTreeMap;
use tracing::{debug, warn};
use zone_core::{Zone, ZoneId, ZoneState};
use zone_geo::{Coordinate, ZoneShape, haversine_distance, point_in_polygon};

/// Read access to the current set of zones.
pub trait ZoneSnapshot {
    fn list_zones(&self) -> Vec<&Zone>;
}

impl ZoneSnapshot for [Zone] {
    fn list_zones(&self) -> Vec<&Zone> {
        self.iter().collect()
    }
}

impl ZoneSnapshot for Vec<Zone> {
    fn list_zones(&self) -> Vec<&Zone> {
        self.iter().collect()
    }
}

impl ZoneSnapshot for BTreeMap<ZoneId, Zone> {
    fn list_zones(&self) -> Vec<&Zone> {
        self.values().collect()
    }
}

/// Whether `point` lies in `zone`, widening circles by `radius_m`.
///
/// Passive zones are still evaluated here; only [`resolve_active_zone`] skips them.
pub fn is_in_zone(zone: &Zone, point: Coordinate, radius_m: f64) -> bool {
    if zone.state == ZoneState::Unavailable {
        return false;
    }

    match zone.shape() {
        ZoneShape::Polygon { vertices } => polygon_contains(zone, vertices, point),
        ZoneShape::Circle { center, radius_m: zone_radius } => {
            let Some(zone_radius) = zone_radius else {
                debug!(zone_id = %zone.id, "zone has no radius");
                return false;
            };
            match haversine_distance(point, *center) {
                Some(distance) => distance - radius_m < *zone_radius,
                None => false,
            }
        }
    }
}

/// Picks the zone that should be reported for `point`.
///
/// Zones are visited in ascending id order. The first polygon containing the
/// point wins outright. Otherwise the closest containing circle wins, ties on
/// distance going to the smaller radius.
pub fn resolve_active_zone<'a, S>(snapshot: &'a S, point: Coordinate, radius_m: f64) -> Option<&'a Zone>
where
    S: ZoneSnapshot + ?Sized,
{
    let mut zones = snapshot.list_zones();
    zones.sort_by(|a, b| a.id.cmp(&b.id));

    let mut closest: Option<(&Zone, f64, f64)> = None;

    for zone in zones {
        if zone.state == ZoneState::Unavailable || zone.passive {
            continue;
        }

        match zone.shape() {
            ZoneShape::Polygon { vertices } => {
                if polygon_contains(zone, vertices, point) {
                    debug!(zone_id = %zone.id, "point inside polygon zone");
                    return Some(zone);
                }
            }
            ZoneShape::Circle { center, radius_m: zone_radius } => {
                let Some(zone_radius) = *zone_radius else {
                    warn!(zone_id = %zone.id, "skipping zone without radius");
                    continue;
                };
                let Some(zone_dist) = haversine_distance(point, *center) else {
                    warn!(zone_id = %zone.id, "skipping zone without usable coordinates");
                    continue;
                };

                if zone_dist - radius_m >= zone_radius {
                    continue;
                }
                let replaces = match closest {
                    None => true,
                    Some((_, min_dist, best_radius)) => {
                        zone_dist < min_dist || (zone_dist == min_dist && zone_radius < best_radius)
                    }
                };
                if replaces {
                    closest = Some((zone, zone_dist, zone_radius));
                }
            }
        }
    }

    closest.map(|(zone, _, _)| zone)
}

fn polygon_contains(zone: &Zone, vertices: &[Coordinate], point: Coordinate) -> bool {
    match point_in_polygon(point, vertices) {
        Ok(inside) => inside,
        Err(err) => {
            warn!(zone_id = %zone.id, error = %err, "skipping zone with invalid polygon");
            false
        }
    }
}
