use crate::ids::{EntityId, ZoneId};
use thiserror::Error;
use zone_geo::GeoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error(transparent)]
    Geometry(#[from] GeoError),
    #[error("zone name is required")]
    MissingName,
    #[error("invalid icon {0:?}, expected `prefix:name`")]
    InvalidIcon(String),
    #[error("zone {zone_id} is missing {field}")]
    MissingCoordinate {
        zone_id: ZoneId,
        field: &'static str,
    },
    #[error("invalid attribute {field}: {message}")]
    InvalidAttribute {
        field: &'static str,
        message: String,
    },
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("zone not found: {0}")]
    NotFound(ZoneId),
    #[error("zone {0} is not editable")]
    NotEditable(ZoneId),
    #[error("zone id {0} is already in use")]
    DuplicateId(ZoneId),
}

impl ZoneError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Geometry(_)
            | Self::MissingName
            | Self::InvalidIcon(_)
            | Self::MissingCoordinate { .. }
            | Self::InvalidAttribute { .. } => ErrorCode::InvalidInput,
            Self::NotFound(_) | Self::UnknownEntity(_) => ErrorCode::NotFound,
            Self::NotEditable(_) | Self::DuplicateId(_) => ErrorCode::Conflict,
        }
    }

    pub fn is_invalid_shape(&self) -> bool {
        matches!(self, Self::Geometry(GeoError::InvalidShape(_)))
    }
}

pub type ZoneResult<T> = Result<T, ZoneError>;
