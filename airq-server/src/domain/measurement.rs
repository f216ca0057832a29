//! Measurement types shared by the cache and the provider layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of pollutant and weather metrics a station can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueName {
    Pm1,
    Pm25,
    Pm10,
    Pressure,
    Humidity,
    Temperature,
}

/// A single named reading within a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValue {
    pub name: ValueName,
    pub value: f64,
}

/// An averaged air-quality reading with its validity window.
///
/// `approximated` marks readings that were modeled for a location rather
/// than reported by the station itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub from_date_time: DateTime<Utc>,
    pub till_date_time: DateTime<Utc>,
    pub values: Vec<MeasurementValue>,
    /// Common Air Quality Index; the provider may omit it.
    pub caqi: Option<f64>,
    #[serde(default)]
    pub approximated: bool,
}
