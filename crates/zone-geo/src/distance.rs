use crate::Coordinate;

/// Mean Earth radius (IUGG) in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance in meters, `None` when either point is not finite.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> Option<f64> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let arc = 2.0 * h.sqrt().min(1.0).asin();
    Some(EARTH_RADIUS_M * arc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero_meters() {
        let point = Coordinate::new(40.0, -75.0);
        assert_eq!(haversine_distance(point, point), Some(0.0));
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0))
            .expect("finite");
        assert!((distance - 111_195.0).abs() < 10.0, "got {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(52.37, 4.89);
        let b = Coordinate::new(48.85, 2.35);
        let ab = haversine_distance(a, b).expect("finite");
        let ba = haversine_distance(b, a).expect("finite");
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn non_finite_input_has_no_distance() {
        let a = Coordinate::new(f64::NAN, 0.0);
        assert_eq!(haversine_distance(a, Coordinate::new(0.0, 0.0)), None);
    }
}
