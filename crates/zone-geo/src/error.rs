use thiserror::Error;

/// Why a shape was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeDefect {
    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("circle center has a non-finite coordinate")]
    NonFiniteCenter,
    #[error("circle radius {0} is not a finite non-negative number")]
    InvalidRadius(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeDefect),
}

pub type GeoResult<T> = Result<T, GeoError>;
