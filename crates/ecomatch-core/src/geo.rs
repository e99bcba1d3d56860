//! Great-circle distance on a spherical Earth.
//!
//! Distances are reported in kilometers at one-decimal display precision.
//! Comparisons against a radius use the rounded value so a match never
//! shows a distance larger than the radius it was accepted under.

use serde::Serialize;
use thiserror::Error;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("radius must be a positive number of kilometers, got {0}")]
    InvalidRadius(f64),

    #[error("radius is missing or not a number")]
    MissingRadius,
}

impl GeoError {
    /// Wire name of the input component this error refers to.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            GeoError::LatitudeOutOfRange(_) => "lat",
            GeoError::LongitudeOutOfRange(_) => "lon",
            GeoError::InvalidRadius(_) | GeoError::MissingRadius => "radiusKm",
        }
    }
}

/// A WGS-84 position in decimal degrees. Only constructible in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns [`GeoError::LatitudeOutOfRange`] or
    /// [`GeoError::LongitudeOutOfRange`] for non-finite or out-of-range
    /// components. Values are never clamped.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        // Written as a negated range check so NaN is rejected too.
        if !(latitude.abs() <= 90.0) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(longitude.abs() <= 180.0) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Unrounded haversine distance between two coordinates, in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Float error can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round to one decimal place, half away from zero.
#[must_use]
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Haversine distance at display precision (0.1 km).
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    round_tenths(haversine_km(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid coordinate")
    }

    #[test]
    fn coordinate_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range_latitude() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(GeoError::LatitudeOutOfRange(90.5))
        );
    }

    #[test]
    fn coordinate_rejects_out_of_range_longitude() {
        assert_eq!(
            Coordinate::new(0.0, -180.01),
            Err(GeoError::LongitudeOutOfRange(-180.01))
        );
    }

    #[test]
    fn coordinate_rejects_nan() {
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(GeoError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let mumbai = coord(19.0760, 72.8777);
        assert!(distance_km(mumbai, mumbai).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (coord(19.0760, 72.8777), coord(28.7041, 77.1025)),
            (coord(-33.8688, 151.2093), coord(51.5074, -0.1278)),
            (coord(0.0, 179.9), coord(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn mumbai_to_delhi() {
        let d = distance_km(coord(19.0760, 72.8777), coord(28.7041, 77.1025));
        assert!((d - 1153.2).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn bangalore_short_hop() {
        let d = distance_km(coord(12.9716, 77.5946), coord(12.9352, 77.6245));
        assert!((d - 5.2).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn antimeridian_is_short() {
        let d = distance_km(coord(0.0, 179.9), coord(0.0, -179.9));
        assert!(d < 25.0, "got {d}");
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = haversine_km(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn round_tenths_half_away_from_zero() {
        assert!((round_tenths(1.25) - 1.3).abs() < 1e-12);
        assert!((round_tenths(1.24) - 1.2).abs() < 1e-12);
        assert!((round_tenths(-1.25) + 1.3).abs() < 1e-12);
        assert!((round_tenths(0.04)).abs() < 1e-12);
    }

    #[test]
    fn geo_error_components() {
        assert_eq!(GeoError::LatitudeOutOfRange(91.0).component(), "lat");
        assert_eq!(GeoError::LongitudeOutOfRange(181.0).component(), "lon");
        assert_eq!(GeoError::MissingRadius.component(), "radiusKm");
    }
}
