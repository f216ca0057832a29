//! Sensor station identity and record types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::{Coordinates, GeoPoint};
use super::measurement::Measurement;

/// Error returned when parsing an invalid station id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Store-assigned identity of a sensor station.
///
/// Ids are UUIDv7, so they order by creation time. Any `StationId` value is
/// a valid UUID by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(Uuid);

impl StationId {
    /// Mint a fresh id.
    pub fn new() -> Self {
        StationId(Uuid::now_v7())
    }

    /// Parse an id from its string form.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        Uuid::parse_str(s).map(StationId).map_err(|_| InvalidStationId {
            reason: "must be a UUID",
        })
    }
}

impl Default for StationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Upstream data providers. Currently a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Airly,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Airly => f.write_str("airly"),
        }
    }
}

/// The provider-owned fields of a station record: everything the catalog
/// sync writes. Identity, timestamps and the cached measurement belong to
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationFields {
    pub provider: Provider,
    /// The provider's own id for the station; unique per provider.
    pub provider_id: String,
    pub elevation: Option<f64>,
    pub location: GeoPoint,
    pub display_address: String,
}

/// A sensor station as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStation {
    pub id: StationId,
    pub provider: Provider,
    pub provider_id: String,
    pub elevation: Option<f64>,
    pub location: GeoPoint,
    pub display_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_measurement: Option<Measurement>,
}

impl SensorStation {
    /// The station position in latitude/longitude form.
    pub fn coordinates(&self) -> Coordinates {
        self.location.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_string() {
        let id = StationId::new();
        let parsed = StationId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn reject_malformed_id() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("not-a-uuid").is_err());
        assert!(StationId::parse("123").is_err());
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&Provider::Airly).unwrap();
        assert_eq!(json, "\"airly\"");
    }

    #[test]
    fn coordinates_match_location() {
        let location = Coordinates {
            latitude: 50.062,
            longitude: 19.94,
        };
        let station = SensorStation {
            id: StationId::new(),
            provider: Provider::Airly,
            provider_id: "42".to_string(),
            elevation: Some(219.0),
            location: location.into(),
            display_address: "Poland, Krakow".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            latest_measurement: None,
        };
        assert_eq!(station.coordinates(), location);
    }
}
