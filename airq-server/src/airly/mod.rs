//! Airly data provider.
//!
//! HTTP client for the Airly v2 REST API, the one upstream this service
//! currently syncs from. Key characteristics of Airly:
//! - "installation" is Airly's term for a physical sensor station
//! - quota headroom comes back in `X-RateLimit-Remaining-*` headers with
//!   every response
//! - the CAQI index must be requested explicitly with `indexType=CAQI`
//! - a full catalog listing is an unbounded `installations/nearest` query

mod client;
mod convert;
mod types;

pub use client::{AirlyClient, AirlyConfig};
pub use types::{Address, AveragedValues, Index, Installation, MeasurementResponse, RawValue};
