//! Web layer for the air quality service.
//!
//! Exposes the engine's query operations over HTTP with JSON bodies.

mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
