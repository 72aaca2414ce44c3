// geo/mod.rs - Coordinates, great-circle distance and radius filtering

pub mod coordinate;
pub mod distance;
pub mod proximity;

pub use coordinate::{parse_coordinate_pair, validate_latitude, validate_longitude, Coordinate};
pub use distance::{distance_between, haversine_km, EARTH_RADIUS_KM};
pub use proximity::{filter_nearby, parse_radius, Located};

use thiserror::Error;

/// Errors raised while parsing or checking geographic input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid coordinate: '{0}' is not a number")]
    InvalidCoordinate(String),

    #[error("Malformed coordinate pair '{0}', expected \"latitude,longitude\"")]
    MalformedCoordinatePair(String),

    #[error("{axis} {value} is out of range [{min}, {max}]")]
    CoordinateOutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid radius: '{0}' must be a non-negative number")]
    InvalidRadius(String),
}

/// Parse a numeric string the way every geo input is parsed: trimmed, finite only.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
