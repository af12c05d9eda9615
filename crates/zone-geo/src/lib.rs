//! Planar geometry and great-circle distance used for zone containment.
//!
//! Coordinates are treated as planar `(latitude, longitude)` pairs for polygon
//! work; only circular zones go through [`haversine_distance`].

mod distance;
mod error;
mod polygon;

use serde::{Deserialize, Serialize};

pub use distance::{EARTH_RADIUS_M, haversine_distance};
pub use error::{GeoError, GeoResult, ShapeDefect};
pub use polygon::{centroid, point_in_polygon, validate_polygon};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.latitude, value.longitude]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Smallest box enclosing every vertex, `None` for an empty slice.
    pub fn from_vertices(vertices: &[Coordinate]) -> Option<Self> {
        let first = vertices.first()?;
        let initial = Self {
            north: first.latitude,
            south: first.latitude,
            east: first.longitude,
            west: first.longitude,
        };
        Some(vertices.iter().skip(1).fold(initial, |bounds, vertex| Self {
            north: bounds.north.max(vertex.latitude),
            south: bounds.south.min(vertex.latitude),
            east: bounds.east.max(vertex.longitude),
            west: bounds.west.min(vertex.longitude),
        }))
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.latitude <= self.north
            && coord.latitude >= self.south
            && coord.longitude <= self.east
            && coord.longitude >= self.west
    }

    pub fn latitude_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn longitude_span(&self) -> f64 {
        self.east - self.west
    }
}

/// Authoritative extent of a zone.
///
/// A circle keeps its radius optional so that zones rebuilt from incomplete
/// external state can still be represented; such a circle never contains
/// anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneShape {
    Circle {
        center: Coordinate,
        radius_m: Option<f64>,
    },
    Polygon {
        vertices: Vec<Coordinate>,
    },
}

impl ZoneShape {
    pub fn circle(center: Coordinate, radius_m: f64) -> GeoResult<Self> {
        if !center.is_finite() {
            return Err(GeoError::InvalidShape(ShapeDefect::NonFiniteCenter));
        }
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(GeoError::InvalidShape(ShapeDefect::InvalidRadius(radius_m)));
        }
        Ok(Self::Circle {
            center,
            radius_m: Some(radius_m),
        })
    }

    /// Builds a polygon after checking it has a usable centroid.
    pub fn polygon(vertices: Vec<Coordinate>) -> GeoResult<Self> {
        centroid(&vertices)?;
        Ok(Self::Polygon { vertices })
    }

    pub fn vertices(&self) -> Option<&[Coordinate]> {
        match self {
            Self::Polygon { vertices } => Some(vertices),
            Self::Circle { .. } => None,
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Self::Polygon { .. })
    }

    /// Radius shown to consumers. Polygons always report zero.
    pub fn display_radius(&self) -> Option<f64> {
        match self {
            Self::Circle { radius_m, .. } => *radius_m,
            Self::Polygon { .. } => Some(0.0),
        }
    }

    /// Circle center or polygon centroid.
    pub fn center(&self) -> GeoResult<Coordinate> {
        match self {
            Self::Circle { center, .. } => Ok(*center),
            Self::Polygon { vertices } => centroid(vertices),
        }
    }
}
