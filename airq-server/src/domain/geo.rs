//! Coordinate representations and great-circle distance.
//!
//! Two representations of the same position exist side by side:
//! [`Coordinates`] (latitude first, as humans write them) and the GeoJSON
//! [`GeoPoint`] (longitude first, as the store and the wire format want
//! them). They interconvert losslessly, and distance accepts either form
//! for either endpoint.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Marker for the GeoJSON geometry type. Only points occur in this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointType {
    #[default]
    Point,
}

/// A GeoJSON point geometry.
///
/// Axis order is `[longitude, latitude]` - the opposite of [`Coordinates`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub point_type: PointType,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl From<Coordinates> for GeoPoint {
    fn from(location: Coordinates) -> Self {
        GeoPoint {
            point_type: PointType::Point,
            coordinates: [location.longitude, location.latitude],
        }
    }
}

impl From<GeoPoint> for Coordinates {
    fn from(point: GeoPoint) -> Self {
        let [longitude, latitude] = point.coordinates;
        Coordinates {
            latitude,
            longitude,
        }
    }
}

/// Convert decimal degrees to radians.
pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance in kilometers between two positions, by the
/// haversine formula.
///
/// Either coordinate representation is accepted for either endpoint, and
/// the result is symmetric in its arguments.
pub fn distance_km(a: impl Into<Coordinates>, b: impl Into<Coordinates>) -> f64 {
    let (a, b) = (a.into(), b.into());

    let lat_delta = to_radians(b.latitude - a.latitude);
    let lon_delta = to_radians(b.longitude - a.longitude);

    let h = (lat_delta / 2.0).sin().powi(2)
        + to_radians(a.latitude).cos()
            * to_radians(b.latitude).cos()
            * (lon_delta / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
