use crate::{BoundingBox, Coordinate, GeoError, GeoResult, ShapeDefect};

const MIN_VERTICES: usize = 3;
// Relative to the bounding-box area; anything smaller is treated as collinear.
const AREA_TOLERANCE: f64 = 1e-12;
const BOUNDARY_TOLERANCE: f64 = 1e-12;

/// Checks the vertex list describes a usable ring: finite coordinates and at
/// least three distinct vertices. Area is checked by [`centroid`].
pub fn validate_polygon(vertices: &[Coordinate]) -> GeoResult<()> {
    if let Some(index) = vertices.iter().position(|vertex| !vertex.is_finite()) {
        return Err(GeoError::InvalidShape(ShapeDefect::NonFiniteVertex(index)));
    }
    let distinct = distinct_vertex_count(vertices);
    if distinct < MIN_VERTICES {
        return Err(GeoError::InvalidShape(ShapeDefect::TooFewVertices(distinct)));
    }
    Ok(())
}

/// Planar containment over an implicitly closed ring. Points on an edge or a
/// vertex count as inside. Self-intersecting rings give an even-odd answer with
/// no further guarantee.
pub fn point_in_polygon(point: Coordinate, vertices: &[Coordinate]) -> GeoResult<bool> {
    validate_polygon(vertices)?;
    if !point.is_finite() {
        return Ok(false);
    }
    match BoundingBox::from_vertices(vertices) {
        Some(bounds) if bounds.contains(point) => {}
        _ => return Ok(false),
    }

    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for &current in vertices {
        if on_segment(point, previous, current) {
            return Ok(true);
        }
        let straddles = (current.longitude > point.longitude)
            != (previous.longitude > point.longitude);
        if straddles {
            let crossing = (previous.latitude - current.latitude)
                * (point.longitude - current.longitude)
                / (previous.longitude - current.longitude)
                + current.latitude;
            if point.latitude < crossing {
                inside = !inside;
            }
        }
        previous = current;
    }
    Ok(inside)
}

/// Area-weighted centroid via the shoelace formula.
pub fn centroid(vertices: &[Coordinate]) -> GeoResult<Coordinate> {
    validate_polygon(vertices)?;

    // Work relative to the first vertex to keep the cross products small.
    let origin = vertices[0];
    let mut twice_area = 0.0;
    let mut weighted_lat = 0.0;
    let mut weighted_lon = 0.0;

    let mut previous = vertices[vertices.len() - 1];
    for &current in vertices {
        let (x0, y0) = (
            previous.latitude - origin.latitude,
            previous.longitude - origin.longitude,
        );
        let (x1, y1) = (
            current.latitude - origin.latitude,
            current.longitude - origin.longitude,
        );
        let cross = x0 * y1 - x1 * y0;
        twice_area += cross;
        weighted_lat += (x0 + x1) * cross;
        weighted_lon += (y0 + y1) * cross;
        previous = current;
    }

    let extent = BoundingBox::from_vertices(vertices)
        .map(|bounds| bounds.latitude_span() * bounds.longitude_span())
        .unwrap_or(0.0);
    if !twice_area.is_finite() || twice_area.abs() <= AREA_TOLERANCE * extent {
        return Err(GeoError::InvalidShape(ShapeDefect::ZeroArea));
    }

    let scale = 3.0 * twice_area;
    Ok(Coordinate::new(
        origin.latitude + weighted_lat / scale,
        origin.longitude + weighted_lon / scale,
    ))
}

fn on_segment(point: Coordinate, start: Coordinate, end: Coordinate) -> bool {
    let cross = (end.latitude - start.latitude) * (point.longitude - start.longitude)
        - (end.longitude - start.longitude) * (point.latitude - start.latitude);
    if cross.abs() > BOUNDARY_TOLERANCE {
        return false;
    }
    point.latitude >= start.latitude.min(end.latitude)
        && point.latitude <= start.latitude.max(end.latitude)
        && point.longitude >= start.longitude.min(end.longitude)
        && point.longitude <= start.longitude.max(end.longitude)
}

fn distinct_vertex_count(vertices: &[Coordinate]) -> usize {
    let mut sorted: Vec<Coordinate> = vertices.to_vec();
    sorted.sort_by(|a, b| {
        a.latitude
            .total_cmp(&b.latitude)
            .then(a.longitude.total_cmp(&b.longitude))
    });
    sorted.dedup();
    sorted.len()
}
