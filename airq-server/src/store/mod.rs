//! Persistence of sensor stations and their cached measurements.

mod memory;

pub use memory::MemoryStationStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Coordinates, Measurement, SensorStation, StationFields, StationId};

/// Errors from a station store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the operation failed mid-flight.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Persistent home of station records and their last-known measurements.
///
/// Catalog sync and the measurement cache are independent write paths onto
/// the same record: [`StationStore::upsert_many`] never touches
/// `latest_measurement`, and [`StationStore::set_latest_measurement`] never
/// touches the catalog fields.
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Fetch a station by identity.
    async fn get_by_id(&self, id: &StationId) -> Result<Option<SensorStation>, StoreError>;

    /// The closest station within `max_distance_m` meters of `location`,
    /// or `None` if nothing is in range.
    async fn find_nearest(
        &self,
        location: Coordinates,
        max_distance_m: f64,
    ) -> Result<Option<SensorStation>, StoreError>;

    /// Insert or update stations keyed by (provider, provider_id).
    ///
    /// Existing records keep their `created_at` and cached measurement;
    /// `updated_at` is always refreshed. Returns the number of records
    /// created or whose provider fields actually changed.
    async fn upsert_many(&self, stations: Vec<StationFields>) -> Result<u64, StoreError>;

    /// Overwrite the cached measurement of one station. Returns the number
    /// of records updated (0 when the station is gone).
    async fn set_latest_measurement(
        &self,
        id: &StationId,
        measurement: Measurement,
    ) -> Result<u64, StoreError>;

    /// Delete stations whose `updated_at` is at or before `cutoff`.
    /// Returns the number deleted.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
