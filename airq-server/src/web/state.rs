//! Application state for the web layer.

use std::sync::Arc;

use crate::model::SensorStationModel;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The station catalog and measurement-cache engine.
    pub model: Arc<SensorStationModel>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(model: Arc<SensorStationModel>) -> Self {
        Self { model }
    }
}
