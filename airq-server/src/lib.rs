//! Air quality monitoring server.
//!
//! Keeps a local catalog of air-quality sensor stations in sync with an
//! upstream provider and answers "what is the air like near this point?"
//! queries from a per-station measurement cache.

pub mod airly;
pub mod config;
pub mod domain;
pub mod model;
pub mod provider;
pub mod ratelimit;
pub mod store;
pub mod web;
