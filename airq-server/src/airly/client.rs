//! Airly HTTP client.
//!
//! Every request obtains the shared credential from the rate-limit
//! registry first and reports the quota headroom from the response headers
//! back to it, so concurrent callers share one budget.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::domain::{Coordinates, Measurement, StationFields};
use crate::provider::{ProviderClient, ProviderError};
use crate::ratelimit::{KeyRegistry, RemainingQuota};

use super::convert::{installation_to_fields, measurement_to_domain};
use super::types::{Installation, MeasurementResponse};

/// Default base URL for the Airly v2 API.
const DEFAULT_BASE_URL: &str = "https://airapi.airly.eu/v2";

/// Header carrying the API credential.
const HEADER_APIKEY: &str = "apikey";

/// Remaining-quota response headers, one per window.
const HEADER_REMAINING_SECOND: &str = "X-RateLimit-Remaining-second";
const HEADER_REMAINING_MINUTE: &str = "X-RateLimit-Remaining-minute";
const HEADER_REMAINING_DAY: &str = "X-RateLimit-Remaining-day";

/// Catalog queries center here; Airly wants a reference point even for an
/// unbounded listing.
const CENTER_OF_POLAND: Coordinates = Coordinates {
    latitude: 52.069344,
    longitude: 19.480202,
};

const USER_AGENT: &str = concat!("AirqServer/", env!("CARGO_PKG_VERSION"));

/// Configuration for the Airly client.
#[derive(Debug, Clone)]
pub struct AirlyConfig {
    /// Base URL for the API (defaults to production Airly)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AirlyConfig {
    /// Create a config with production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for AirlyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Airly v2 API client.
pub struct AirlyClient {
    http: reqwest::Client,
    base_url: String,
    keys: Arc<KeyRegistry>,
}

impl AirlyClient {
    /// Create a new Airly client sharing the given credential registry.
    pub fn new(config: AirlyConfig, keys: Arc<KeyRegistry>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            keys,
        })
    }

    /// One GET against the API: credential from the registry, headroom back
    /// to it, status mapping shared by every endpoint. `Ok(None)` is a 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ProviderError> {
        let key = self.keys.issue_key()?;

        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header(HEADER_APIKEY, key.as_str())
            .query(query)
            .send()
            .await?;

        self.keys.record_usage(remaining_quota(response.headers()));

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if matches!(status.as_u16(), 401 | 403 | 422) {
            error!(%url, "Airly rejected the configured API key");
            return Err(ProviderError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed = serde_json::from_str(&body).map_err(|e| ProviderError::Json {
            message: e.to_string(),
        })?;

        Ok(Some(parsed))
    }
}

/// Parse whatever remaining-quota headers the response carries.
fn remaining_quota(headers: &HeaderMap) -> RemainingQuota {
    let parse = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    };

    RemainingQuota {
        second: parse(HEADER_REMAINING_SECOND),
        minute: parse(HEADER_REMAINING_MINUTE),
        day: parse(HEADER_REMAINING_DAY),
    }
}

#[async_trait]
impl ProviderClient for AirlyClient {
    async fn list_installations(&self) -> Result<Vec<StationFields>, ProviderError> {
        let mut installations: Vec<Installation> = self
            .get_json(
                "installations/nearest",
                &[
                    ("lat", CENTER_OF_POLAND.latitude.to_string()),
                    ("lng", CENTER_OF_POLAND.longitude.to_string()),
                    // -1 lifts the server-side bounds on both
                    ("maxDistanceKM", "-1".to_string()),
                    ("maxResults", "-1".to_string()),
                ],
            )
            .await?
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: "installation catalog not found".to_string(),
            })?;

        installations.sort_by_key(|installation| installation.id);

        Ok(installations.iter().map(installation_to_fields).collect())
    }

    async fn get_measurement(
        &self,
        provider_id: &str,
    ) -> Result<Option<Measurement>, ProviderError> {
        let response: Option<MeasurementResponse> = self
            .get_json(
                "measurements/installation",
                &[
                    ("indexType", "CAQI".to_string()),
                    ("installationId", provider_id.to_string()),
                ],
            )
            .await?;

        Ok(response.map(measurement_to_domain))
    }

    async fn get_approximated_measurement(
        &self,
        location: Coordinates,
    ) -> Result<Option<Measurement>, ProviderError> {
        let response: Option<MeasurementResponse> = self
            .get_json(
                "measurements/point",
                &[
                    ("indexType", "CAQI".to_string()),
                    ("lat", location.latitude.to_string()),
                    ("lng", location.longitude.to_string()),
                ],
            )
            .await?;

        Ok(response.map(|response| Measurement {
            approximated: true,
            ..measurement_to_domain(response)
        }))
    }
}
