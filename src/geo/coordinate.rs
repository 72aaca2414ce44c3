use serde::{Deserialize, Serialize};

use super::{parse_number, GeoError};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a checked coordinate from two numeric strings.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, GeoError> {
        let lat = parse_number(latitude)
            .ok_or_else(|| GeoError::InvalidCoordinate(latitude.trim().to_string()))?;
        let lon = parse_number(longitude)
            .ok_or_else(|| GeoError::InvalidCoordinate(longitude.trim().to_string()))?;

        Ok(Self::new(validate_latitude(lat)?, validate_longitude(lon)?))
    }
}

pub fn validate_latitude(value: f64) -> Result<f64, GeoError> {
    check_range("latitude", value, LATITUDE_RANGE)
}

pub fn validate_longitude(value: f64) -> Result<f64, GeoError> {
    check_range("longitude", value, LONGITUDE_RANGE)
}

fn check_range(axis: &'static str, value: f64, (min, max): (f64, f64)) -> Result<f64, GeoError> {
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(GeoError::CoordinateOutOfRange { axis, value, min, max })
    }
}

/// Parse a combined `"lat,lon"` string.
///
/// Exactly two comma separated numeric components are required; whitespace
/// around each component is ignored. Shape problems are reported as
/// `MalformedCoordinatePair`, range problems as `CoordinateOutOfRange`.
pub fn parse_coordinate_pair(raw: &str) -> Result<Coordinate, GeoError> {
    let malformed = || GeoError::MalformedCoordinatePair(raw.to_string());

    let parts: Vec<&str> = raw.split(',').collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(malformed());
    };

    let lat = parse_number(lat).ok_or_else(malformed)?;
    let lon = parse_number(lon).ok_or_else(malformed)?;

    Ok(Coordinate::new(validate_latitude(lat)?, validate_longitude(lon)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundaries_and_origin() {
        assert_eq!(parse_coordinate_pair("-90,180").unwrap(), Coordinate::new(-90.0, 180.0));
        assert_eq!(parse_coordinate_pair("0,0").unwrap(), Coordinate::new(0.0, 0.0));
        assert_eq!(parse_coordinate_pair("90,-180").unwrap(), Coordinate::new(90.0, -180.0));
    }

    #[test]
    fn trims_whitespace_around_components() {
        let c = parse_coordinate_pair("  -6.2 ,  106.8 ").unwrap();
        assert_eq!(c, Coordinate::new(-6.2, 106.8));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            parse_coordinate_pair("91,0"),
            Err(GeoError::CoordinateOutOfRange { axis: "latitude", .. })
        ));
        assert!(matches!(
            parse_coordinate_pair("0,181"),
            Err(GeoError::CoordinateOutOfRange { axis: "longitude", .. })
        ));
    }

    #[test]
    fn rejects_malformed_pairs() {
        for raw in ["abc,12", "1,2,3", "12", "", ",", "1,", "NaN,1", "inf,0"] {
            assert!(
                matches!(parse_coordinate_pair(raw), Err(GeoError::MalformedCoordinatePair(_))),
                "expected malformed for {:?}",
                raw
            );
        }
    }

    #[test]
    fn parse_reports_the_offending_component() {
        assert_eq!(
            Coordinate::parse("x", "10"),
            Err(GeoError::InvalidCoordinate("x".to_string()))
        );
        assert!(Coordinate::parse("-6.2", "106.8").is_ok());
        assert!(Coordinate::parse("-95", "106.8").is_err());
    }
}
