//! Wire types for the Airly v2 API.
//!
//! Only the fields this service consumes are modeled; serde ignores the
//! rest of the payload.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::Coordinates;

/// A physical sensor station, as Airly calls it.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: i64,
    pub location: Coordinates,
    #[serde(default)]
    pub address: Address,
    pub elevation: Option<f64>,
}

/// Installation street address; every field may be missing or empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub display_address1: Option<String>,
    pub display_address2: Option<String>,
}

/// Response of the measurement endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementResponse {
    pub current: AveragedValues,
}

/// One averaged reading window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragedValues {
    pub from_date_time: DateTime<Utc>,
    pub till_date_time: DateTime<Utc>,
    #[serde(default)]
    pub values: Vec<RawValue>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// A raw named reading.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValue {
    pub name: String,
    pub value: f64,
}

/// An air-quality index entry; the value may be null for offline stations.
#[derive(Debug, Clone, Deserialize)]
pub struct Index {
    pub name: String,
    pub value: Option<f64>,
}
