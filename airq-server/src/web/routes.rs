//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::domain::{Coordinates, StationId};
use crate::model::ModelError;

use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations/nearest", get(nearest_station))
        .route("/stations/:id", get(station_by_id))
        .route("/stations/:id/measurement", get(latest_measurement))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Station record by id.
async fn station_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_station_id(&id)?;

    match state.model.get_station(&id).await? {
        Some(station) => Ok(Json(station).into_response()),
        None => Err(AppError::NotFound {
            message: format!("no sensor station with id {id}"),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct NearestQuery {
    latitude: f64,
    longitude: f64,
}

/// Closest station to the query point, if any is within range.
async fn nearest_station(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> Result<Response, AppError> {
    let location = Coordinates {
        latitude: query.latitude,
        longitude: query.longitude,
    };

    match state.model.get_nearest_station(location).await? {
        Some(nearest) => Ok(Json(nearest).into_response()),
        None => Err(AppError::NotFound {
            message: "no sensor station in vicinity".to_string(),
        }),
    }
}

/// Latest measurement for a station, served through the cache.
async fn latest_measurement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_station_id(&id)?;
    let measurement = state.model.get_latest_measurement(&id).await?;
    Ok(Json(measurement).into_response())
}

fn parse_station_id(raw: &str) -> Result<StationId, AppError> {
    StationId::parse(raw).map_err(|_| AppError::BadRequest {
        message: format!("invalid station id: {raw}"),
    })
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Web-layer error with its HTTP status mapping.
#[derive(Debug)]
enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    RateLimited { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        let message = e.to_string();
        match e {
            ModelError::NotFound { .. } => AppError::NotFound { message },
            ModelError::RateLimit(_) => AppError::RateLimited { message },
            ModelError::Upstream(_) | ModelError::NoMeasurement { .. } => {
                AppError::Upstream { message }
            }
            ModelError::Store(_) => AppError::Internal { message },
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::RateLimited { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message,
        };

        tracing::error!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
