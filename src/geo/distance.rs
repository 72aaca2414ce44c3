use super::{parse_number, Coordinate, GeoError};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers using the haversine formula.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two points given as numeric strings.
///
/// Library entry point for callers holding raw coordinate text. The ticket
/// service already has parsed `Coordinate`s and goes through `haversine_km`.
/// Range is not checked here.
pub fn distance_between(
    latitude1: &str,
    longitude1: &str,
    latitude2: &str,
    longitude2: &str,
) -> Result<f64, GeoError> {
    let number = |raw: &str| {
        parse_number(raw).ok_or_else(|| GeoError::InvalidCoordinate(raw.trim().to_string()))
    };

    let from = Coordinate::new(number(latitude1)?, number(longitude1)?);
    let to = Coordinate::new(number(latitude2)?, number(longitude2)?);
    Ok(haversine_km(from, to))
}
