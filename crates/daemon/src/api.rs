use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lifeline_core::api::{
    ApiError, EngineStatus, IngestResponse, MotionIngestRequest, VolumeIngestRequest,
};
use lifeline_core::validation::{normalize, validate_config};
use lifeline_core::EmergencyConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::dispatcher::{DispatchError, DispatcherHandle};
use crate::store::{load_emergency_config, save_emergency_config, ConfigStore};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: DispatcherHandle,
    pub store: Arc<dyn ConfigStore>,
}

impl AppState {
    pub fn new(dispatcher: DispatcherHandle, store: Arc<dyn ConfigStore>) -> Self {
        Self { dispatcher, store }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn fail(status: StatusCode, error: impl ToString) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
        }),
    )
}

fn unavailable(e: DispatchError) -> (StatusCode, Json<ApiError>) {
    warn!(error = %e, "dispatcher unavailable");
    fail(StatusCode::SERVICE_UNAVAILABLE, e)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/motion", post(ingest_motion))
        .route("/v1/volume", post(ingest_volume))
        .route(
            "/v1/config",
            get(get_config).put(put_config).delete(delete_config),
        )
        .route("/v1/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn ingest_motion(
    State(state): State<AppState>,
    Json(req): Json<MotionIngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let readings = req.into_readings();
    let received = readings.len();
    let outcomes = state.dispatcher.motion(readings).await.map_err(unavailable)?;
    Ok(Json(IngestResponse { received, outcomes }))
}

pub async fn ingest_volume(
    State(state): State<AppState>,
    Json(req): Json<VolumeIngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let outcomes = state.dispatcher.volume(req.value).await.map_err(unavailable)?;
    Ok(Json(IngestResponse {
        received: 1,
        outcomes,
    }))
}

pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<EmergencyConfig>> {
    match load_emergency_config(state.store.as_ref()) {
        Ok(Some(config)) => Ok(Json(config)),
        Ok(None) => Err(fail(StatusCode::NOT_FOUND, "no emergency contact configured")),
        Err(e) => {
            warn!(error = %e, "load config failed");
            Err(fail(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Validate, persist, then hand the new snapshot to the dispatcher.
///
/// The store is written first. If the dispatcher is gone (503) the saved
/// contacts still take effect on the next start.
pub async fn put_config(
    State(state): State<AppState>,
    Json(req): Json<EmergencyConfig>,
) -> ApiResult<Json<EmergencyConfig>> {
    let config = normalize(req);
    validate_config(&config).map_err(|e| fail(StatusCode::BAD_REQUEST, e))?;

    save_emergency_config(state.store.as_ref(), &config).map_err(|e| {
        warn!(error = %e, "save config failed");
        fail(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;
    state
        .dispatcher
        .set_config(Some(config.clone()))
        .await
        .map_err(unavailable)?;

    info!(recipients = config.recipient_emails.len(), "emergency contacts saved");
    Ok(Json(config))
}

pub async fn delete_config(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.store.clear().map_err(|e| {
        warn!(error = %e, "clear config failed");
        fail(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;
    state.dispatcher.set_config(None).await.map_err(unavailable)?;

    info!("emergency contacts reset");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(State(state): State<AppState>) -> ApiResult<Json<EngineStatus>> {
    let status = state.dispatcher.status().await.map_err(unavailable)?;
    Ok(Json(status))
}
