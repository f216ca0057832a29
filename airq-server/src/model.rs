//! The synchronization and caching engine.
//!
//! This is the one place with cross-cutting policy: when a cached
//! measurement is still good, when to go upstream, when a station counts
//! as offline, and how the catalog is kept fresh. Store and provider stay
//! narrow behind their traits.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Coordinates, Measurement, SensorStation, StationId, distance_km};
use crate::provider::{ProviderClient, ProviderError};
use crate::ratelimit::KeyExhausted;
use crate::store::{StationStore, StoreError};

/// Catalog upserts go to the store in batches of this size, sequential
/// across batches, to bound in-flight write concurrency.
const UPSERT_BATCH_SIZE: usize = 1000;

/// Policy knobs of the engine.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// How long past its own validity window a cached measurement may still
    /// be served (seconds).
    pub measurement_ttl_secs: i64,
    /// Search radius for nearest-station lookups (meters).
    pub near_max_distance_m: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            measurement_ttl_secs: 900,
            near_max_distance_m: 2500.0,
        }
    }
}

/// A nearest-station lookup hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestStation {
    /// Great-circle distance from the query point, in kilometers.
    pub distance: f64,
    pub station: SensorStation,
}

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("sensor station {station} not found")]
    NotFound { station: StationId },

    /// The shared credential is resting; the caller may skip this cycle.
    #[error(transparent)]
    RateLimit(KeyExhausted),

    /// An upstream provider call failed.
    #[error("upstream provider call failed: {0}")]
    Upstream(ProviderError),

    /// The station yielded nothing and neither did the approximation.
    #[error("no measurement available for station {station}, live or approximated")]
    NoMeasurement { station: StationId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProviderError> for ModelError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::KeyExhausted(e) => ModelError::RateLimit(e),
            other => ModelError::Upstream(other),
        }
    }
}

/// The station catalog and measurement-cache orchestrator.
pub struct SensorStationModel {
    store: Arc<dyn StationStore>,
    provider: Arc<dyn ProviderClient>,
    config: ModelConfig,
}

impl SensorStationModel {
    /// Create an engine over the given store and provider.
    pub fn new(
        store: Arc<dyn StationStore>,
        provider: Arc<dyn ProviderClient>,
        config: ModelConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Fetch a station by identity. No upstream calls.
    pub async fn get_station(&self, id: &StationId) -> Result<Option<SensorStation>, ModelError> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// The closest station within the configured search radius, with its
    /// great-circle distance from the query point.
    pub async fn get_nearest_station(
        &self,
        location: Coordinates,
    ) -> Result<Option<NearestStation>, ModelError> {
        debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            "looking for a sensor station nearby"
        );

        let found = self
            .store
            .find_nearest(location, self.config.near_max_distance_m)
            .await?;

        let Some(station) = found else {
            debug!("no station found in vicinity");
            return Ok(None);
        };

        let distance = distance_km(station.location, location);
        debug!(station = %station.id, distance_km = distance, "closest station found");

        Ok(Some(NearestStation { distance, station }))
    }

    /// Latest measurement for a station, served read-through: a cached
    /// measurement inside its validity window (plus TTL grace) comes back
    /// as is; otherwise one live fetch, at most one approximation fallback,
    /// and the winner overwrites the cache.
    pub async fn get_latest_measurement(
        &self,
        station_id: &StationId,
    ) -> Result<Measurement, ModelError> {
        debug!(station = %station_id, "looking for the latest measurement");

        let station = self
            .store
            .get_by_id(station_id)
            .await?
            .ok_or(ModelError::NotFound {
                station: *station_id,
            })?;

        if let Some(cached) = &station.latest_measurement {
            let valid_till =
                cached.till_date_time + Duration::seconds(self.config.measurement_ttl_secs);
            if Utc::now() < valid_till {
                debug!(station = %station_id, from = %cached.from_date_time, "cached measurement is valid");
                return Ok(cached.clone());
            }
            debug!(station = %station_id, "cached measurement expired");
        }

        let measurement = self.fetch_measurement(&station).await?;
        self.store
            .set_latest_measurement(station_id, measurement.clone())
            .await?;

        Ok(measurement)
    }

    /// One live fetch, then the single approximation hop if the station
    /// looks offline. Approximated results are never re-approximated.
    async fn fetch_measurement(&self, station: &SensorStation) -> Result<Measurement, ModelError> {
        debug!(station = %station.id, provider_id = %station.provider_id, "fetching new measurement");

        let live = match self.provider.get_measurement(&station.provider_id).await {
            Ok(measurement) => measurement,
            // Without the credential the fallback would fail the same way.
            Err(ProviderError::KeyExhausted(e)) => return Err(ModelError::RateLimit(e)),
            Err(e) => {
                warn!(station = %station.id, error = %e, "live measurement fetch failed");
                None
            }
        };

        match live {
            Some(measurement) if measurement.caqi.is_some() && !measurement.values.is_empty() => {
                Ok(measurement)
            }
            // No measurement, no CAQI or no values: the station is probably
            // offline, ask for the modeled reading at its location instead.
            _ => {
                let location = station.coordinates();
                debug!(
                    station = %station.id,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "fetching approximated measurement"
                );

                self.provider
                    .get_approximated_measurement(location)
                    .await?
                    .ok_or(ModelError::NoMeasurement {
                        station: station.id,
                    })
            }
        }
    }

    /// Refresh the local catalog from the provider. A catalog fetch failure
    /// aborts the whole run; nothing is written.
    pub async fn synchronise_stations(&self) -> Result<u64, ModelError> {
        info!("synchronising sensor stations from the provider");

        let stations = self.provider.list_installations().await?;
        info!(count = stations.len(), "stations found upstream");

        let mut modified = 0;
        for chunk in stations.chunks(UPSERT_BATCH_SIZE) {
            modified += self.store.upsert_many(chunk.to_vec()).await?;
        }

        info!(modified, "station records created or updated");
        Ok(modified)
    }

    /// Purge stations that no sync has seen for `days_back` days; they were
    /// probably removed from the provider's catalog.
    pub async fn delete_old(&self, days_back: i64) -> Result<u64, ModelError> {
        info!(days_back, "deleting sensor stations missing upstream");

        let cutoff = Utc::now() - Duration::days(days_back);
        let deleted = self.store.delete_older_than(cutoff).await?;

        info!(deleted, "station records deleted");
        Ok(deleted)
    }
}
