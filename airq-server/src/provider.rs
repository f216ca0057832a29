//! The upstream data-provider seam.
//!
//! The engine talks to its upstream through this interface and never
//! dispatches on a provider name; adding an upstream means adding an
//! implementation, not editing the engine.

use async_trait::async_trait;

use crate::domain::{Coordinates, Measurement, StationFields};
use crate::ratelimit::KeyExhausted;

/// Errors from a provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The shared credential is resting; no request was sent.
    #[error(transparent)]
    KeyExhausted(#[from] KeyExhausted),

    /// HTTP transport failure (network error, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream rejected the credential.
    #[error("unauthorized: check the configured API key")]
    Unauthorized,

    /// The upstream answered with an error status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not parse.
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

/// A client for one upstream air-quality data provider.
///
/// Every call obtains the shared credential from the rate-limit registry
/// and reports the provider's remaining-quota headroom back after the
/// response.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The provider's full station catalog, mapped to station fields.
    async fn list_installations(&self) -> Result<Vec<StationFields>, ProviderError>;

    /// Latest measurement for one station, by provider-specific id.
    ///
    /// `Ok(None)` means the provider knows no measurement for it.
    async fn get_measurement(&self, provider_id: &str)
    -> Result<Option<Measurement>, ProviderError>;

    /// Modeled measurement for a location, used when a station yields no
    /// usable data. Implementations mark the result `approximated`.
    async fn get_approximated_measurement(
        &self,
        location: Coordinates,
    ) -> Result<Option<Measurement>, ProviderError>;
}
