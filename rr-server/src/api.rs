//! REST API and SSE routes

use crate::replay::{start_playback_task, stop_playback_task, FrameEvent, ReplayInfo, ReplaySession};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use rr_core::model::{Algorithm, OptimizationRequest};
use rr_core::optimizer::OptimizeError;
use rr_core::playback::Speed;
use rr_core::{interpolate, InterpolatedFrame};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;

type ApiError = (StatusCode, String);

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/optimize", post(optimize))
        // Replay endpoints
        .route("/api/replay/info", get(replay_info))
        .route("/api/replay/frame", get(replay_frame))
        .route("/api/replay/control", post(replay_control))
        .route("/api/replay/stream", get(replay_stream))
        .route("/api/replay", delete(replay_delete))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn no_replay() -> ApiError {
    (StatusCode::NOT_FOUND, "No active replay".to_string())
}

fn bad_request(e: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

// === Service Endpoints ===

#[derive(Serialize)]
struct AlgorithmInfo {
    code: &'static str,
    label: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let algorithms: Vec<AlgorithmInfo> = Algorithm::ALL
        .iter()
        .map(|a| AlgorithmInfo {
            code: a.code(),
            label: a.label(),
        })
        .collect();

    Json(serde_json::json!({
        "status": "running",
        "optimizer": state.optimizer.name(),
        "algorithms": algorithms,
    }))
}

/// Submit locations for optimization and start a new replay session
async fn optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate().map_err(bad_request)?;

    tracing::info!(
        "Optimizing {} locations with {} via {}",
        request.locations.len(),
        request.algorithm,
        state.optimizer.name()
    );

    let result = state.optimizer.optimize(&request).await.map_err(|e| {
        tracing::warn!("Optimization failed: {}", e);
        let status = match e {
            OptimizeError::Invalid(_) => StatusCode::BAD_REQUEST,
            OptimizeError::Rejected { .. }
            | OptimizeError::Transport(_)
            | OptimizeError::Malformed(_) => StatusCode::BAD_GATEWAY,
        };
        (status, e.to_string())
    })?;

    let session = ReplaySession::from_response(result).map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Optimization service returned an unusable route: {}", e),
        )
    })?;

    let info = session.info();
    let result = session.result().clone();
    let event = session.event(Vec::new());

    // The old timer must be gone before the new route is visible to it
    stop_playback_task(&state).await;
    {
        let mut current = state.session.write().await;
        *current = Some(session);
    }
    state.publish(event);

    tracing::info!("Replay {} ready ({} segments)", info.replay_id, info.segments);

    Ok(Json(serde_json::json!({
        "status": "ok",
        "info": info,
        "result": result,
    })))
}

// === Replay Endpoints ===

async fn replay_info(State(state): State<AppState>) -> Result<Json<ReplayInfo>, ApiError> {
    let session = state.session.read().await;
    session
        .as_ref()
        .map(|rs| Json(rs.info()))
        .ok_or_else(no_replay)
}

#[derive(Deserialize)]
struct FrameQuery {
    progress: Option<f64>,
}

#[derive(Serialize)]
struct FrameResponse {
    progress: f64,
    frame: InterpolatedFrame,
}

/// Interpolate at an arbitrary progress value without touching playback
async fn replay_frame(
    State(state): State<AppState>,
    Query(query): Query<FrameQuery>,
) -> Result<Json<FrameResponse>, ApiError> {
    let session = state.session.read().await;
    let rs = session.as_ref().ok_or_else(no_replay)?;

    let driver = rs.driver();
    let progress = query
        .progress
        .unwrap_or(driver.state().progress)
        .clamp(0.0, 100.0);

    Ok(Json(FrameResponse {
        progress,
        frame: interpolate(driver.route(), progress),
    }))
}

#[derive(Deserialize)]
struct ReplayControlRequest {
    action: String,
    value: Option<f64>,
}

enum Timer {
    Start,
    Stop,
    Keep,
}

async fn replay_control(
    State(state): State<AppState>,
    Json(request): Json<ReplayControlRequest>,
) -> Result<Json<FrameEvent>, ApiError> {
    let (event, timer) = {
        let mut session = state.session.write().await;
        let rs = session.as_mut().ok_or_else(no_replay)?;
        let driver = rs.driver_mut();

        let timer = match request.action.as_str() {
            "play" => {
                driver.play().map_err(bad_request)?;
                Timer::Start
            }
            "pause" => {
                driver.pause();
                Timer::Stop
            }
            "toggle" => {
                if driver.toggle().map_err(bad_request)? {
                    Timer::Start
                } else {
                    Timer::Stop
                }
            }
            "reset" => {
                driver.reset();
                Timer::Stop
            }
            "speed" => {
                let value = request
                    .value
                    .ok_or_else(|| bad_request("Missing 'value' for speed"))?;
                driver.set_speed(Speed::try_from(value).map_err(bad_request)?);
                Timer::Keep
            }
            other => return Err(bad_request(format!("Unknown action: {}", other))),
        };

        (rs.event(Vec::new()), timer)
    };

    match timer {
        Timer::Start => start_playback_task(state.clone()).await,
        Timer::Stop => stop_playback_task(&state).await,
        Timer::Keep => {}
    }

    state.publish(event.clone());
    Ok(Json(event))
}

async fn replay_delete(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    stop_playback_task(&state).await;

    {
        let mut session = state.session.write().await;
        if session.is_none() {
            return Err(no_replay());
        }
        *session = None;
    }

    tracing::info!("Replay stopped and cleaned up");
    Ok(StatusCode::NO_CONTENT)
}

// === Frame Stream Endpoint ===

async fn replay_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Broadcast stream error: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
