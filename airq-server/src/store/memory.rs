//! In-memory station store.
//!
//! Backs the single-process deployment and the engine's tests. Nearest
//! lookup is a linear haversine scan over the catalog; an indexed store can
//! replace this behind the same trait without touching the engine.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    Coordinates, Measurement, SensorStation, StationFields, StationId, distance_km,
};

use super::{StationStore, StoreError};

/// Station store backed by a process-local map.
#[derive(Default)]
pub struct MemoryStationStore {
    stations: RwLock<HashMap<StationId, SensorStation>>,
}

impl MemoryStationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stations currently held.
    pub async fn len(&self) -> usize {
        self.stations.read().await.len()
    }

    /// Whether the catalog is empty.
    pub async fn is_empty(&self) -> bool {
        self.stations.read().await.is_empty()
    }

    /// Insert a fully-formed record, bypassing upsert bookkeeping.
    #[cfg(test)]
    pub(crate) async fn insert(&self, station: SensorStation) {
        self.stations.write().await.insert(station.id, station);
    }
}

#[async_trait]
impl StationStore for MemoryStationStore {
    async fn get_by_id(&self, id: &StationId) -> Result<Option<SensorStation>, StoreError> {
        Ok(self.stations.read().await.get(id).cloned())
    }

    async fn find_nearest(
        &self,
        location: Coordinates,
        max_distance_m: f64,
    ) -> Result<Option<SensorStation>, StoreError> {
        let stations = self.stations.read().await;
        let max_km = max_distance_m / 1000.0;

        let nearest = stations
            .values()
            .map(|station| (distance_km(location, station.location), station))
            .filter(|(distance, _)| *distance <= max_km)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, station)| station.clone());

        Ok(nearest)
    }

    async fn upsert_many(&self, fields: Vec<StationFields>) -> Result<u64, StoreError> {
        let mut stations = self.stations.write().await;
        let now = Utc::now();
        let mut modified = 0;

        for incoming in fields {
            let existing = stations.values_mut().find(|station| {
                station.provider == incoming.provider && station.provider_id == incoming.provider_id
            });

            match existing {
                Some(station) => {
                    if fields_differ(station, &incoming) {
                        station.elevation = incoming.elevation;
                        station.location = incoming.location;
                        station.display_address = incoming.display_address;
                        modified += 1;
                    }
                    // An unchanged but still-present station must not age
                    // out of the cleanup sweep.
                    station.updated_at = now;
                }
                None => {
                    let id = StationId::new();
                    stations.insert(
                        id,
                        SensorStation {
                            id,
                            provider: incoming.provider,
                            provider_id: incoming.provider_id,
                            elevation: incoming.elevation,
                            location: incoming.location,
                            display_address: incoming.display_address,
                            created_at: now,
                            updated_at: now,
                            latest_measurement: None,
                        },
                    );
                    modified += 1;
                }
            }
        }

        Ok(modified)
    }

    async fn set_latest_measurement(
        &self,
        id: &StationId,
        measurement: Measurement,
    ) -> Result<u64, StoreError> {
        let mut stations = self.stations.write().await;

        match stations.get_mut(id) {
            Some(station) => {
                station.latest_measurement = Some(measurement);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut stations = self.stations.write().await;
        let before = stations.len();

        stations.retain(|_, station| station.updated_at > cutoff);

        Ok((before - stations.len()) as u64)
    }
}

fn fields_differ(station: &SensorStation, fields: &StationFields) -> bool {
    station.elevation != fields.elevation
        || station.location != fields.location
        || station.display_address != fields.display_address
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, Provider};
    use chrono::Duration;

    fn fields(provider_id: &str, latitude: f64, longitude: f64) -> StationFields {
        StationFields {
            provider: Provider::Airly,
            provider_id: provider_id.to_string(),
            elevation: Some(100.0),
            location: GeoPoint::from(Coordinates {
                latitude,
                longitude,
            }),
            display_address: "Poland, Krakow".to_string(),
        }
    }

    fn measurement() -> Measurement {
        Measurement {
            from_date_time: Utc::now() - Duration::hours(1),
            till_date_time: Utc::now(),
            values: vec![],
            caqi: Some(20.0),
            approximated: false,
        }
    }

    async fn station_by_provider_id(
        store: &MemoryStationStore,
        provider_id: &str,
    ) -> SensorStation {
        store
            .stations
            .read()
            .await
            .values()
            .find(|station| station.provider_id == provider_id)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_records() {
        let store = MemoryStationStore::new();

        let modified = store
            .upsert_many(vec![fields("1", 50.0, 19.9), fields("2", 50.1, 19.9)])
            .await
            .unwrap();

        assert_eq!(modified, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn upsert_identical_counts_zero_but_touches_updated_at() {
        let store = MemoryStationStore::new();
        store.upsert_many(vec![fields("1", 50.0, 19.9)]).await.unwrap();
        let first = station_by_provider_id(&store, "1").await;

        let modified = store.upsert_many(vec![fields("1", 50.0, 19.9)]).await.unwrap();
        assert_eq!(modified, 0);

        let second = station_by_provider_id(&store, "1").await;
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_counts_changed_fields() {
        let store = MemoryStationStore::new();
        store.upsert_many(vec![fields("1", 50.0, 19.9)]).await.unwrap();

        let mut changed = fields("1", 50.0, 19.9);
        changed.display_address = "Poland, Warsaw".to_string();

        let modified = store.upsert_many(vec![changed]).await.unwrap();
        assert_eq!(modified, 1);

        let station = station_by_provider_id(&store, "1").await;
        assert_eq!(station.display_address, "Poland, Warsaw");
    }

    #[tokio::test]
    async fn upsert_preserves_cached_measurement() {
        let store = MemoryStationStore::new();
        store.upsert_many(vec![fields("1", 50.0, 19.9)]).await.unwrap();
        let id = station_by_provider_id(&store, "1").await.id;

        store.set_latest_measurement(&id, measurement()).await.unwrap();
        store.upsert_many(vec![fields("1", 50.0, 19.9)]).await.unwrap();

        let station = store.get_by_id(&id).await.unwrap().unwrap();
        assert!(station.latest_measurement.is_some());
    }

    #[tokio::test]
    async fn find_nearest_picks_the_closest_in_range() {
        let store = MemoryStationStore::new();
        // ~1.1 km and ~2.2 km north of the query point
        store
            .upsert_many(vec![fields("near", 50.01, 19.9), fields("far", 50.02, 19.9)])
            .await
            .unwrap();

        let query = Coordinates {
            latitude: 50.0,
            longitude: 19.9,
        };

        let nearest = store.find_nearest(query, 2500.0).await.unwrap().unwrap();
        assert_eq!(nearest.provider_id, "near");
    }

    #[tokio::test]
    async fn find_nearest_respects_the_radius() {
        let store = MemoryStationStore::new();
        // ~11 km away
        store.upsert_many(vec![fields("1", 50.1, 19.9)]).await.unwrap();

        let query = Coordinates {
            latitude: 50.0,
            longitude: 19.9,
        };

        assert!(store.find_nearest(query, 2500.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_measurement_on_missing_station_updates_nothing() {
        let store = MemoryStationStore::new();
        let count = store
            .set_latest_measurement(&StationId::new(), measurement())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn delete_older_than_spares_fresh_records() {
        let store = MemoryStationStore::new();
        store.upsert_many(vec![fields("fresh", 50.0, 19.9)]).await.unwrap();

        let mut stale = station_by_provider_id(&store, "fresh").await;
        stale.id = StationId::new();
        stale.provider_id = "stale".to_string();
        stale.updated_at = Utc::now() - Duration::days(3);
        store.insert(stale).await;

        let deleted = store
            .delete_older_than(Utc::now() - Duration::days(2))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(station_by_provider_id(&store, "fresh").await.provider_id, "fresh");
    }
}
