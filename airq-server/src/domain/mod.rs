//! Domain types for the air quality service.
//!
//! This module contains the coordinate representations, the sensor station
//! record and the measurement types shared by the store, the provider layer
//! and the engine. Types validate their invariants at construction time
//! where they have any.

mod geo;
mod measurement;
mod station;

pub use geo::{Coordinates, EARTH_RADIUS_KM, GeoPoint, PointType, distance_km, to_radians};
pub use measurement::{Measurement, MeasurementValue, ValueName};
pub use station::{InvalidStationId, Provider, SensorStation, StationFields, StationId};
