//! Replay session and playback timer
//!
//! A session pairs the optimization result with the progress driver that
//! replays it. The playback task is the fixed-cadence timer: while it runs it
//! is the only code that advances progress, and it is cancelled whenever
//! playback pauses, resets, or the session is replaced.

use crate::state::AppState;
use chrono::{DateTime, Utc};
use rr_core::model::{OptimizationResponse, Route};
use rr_core::playback::{PlaybackState, PlaybackStatus, ProgressDriver, Speed, TickOutcome, TICK_INTERVAL};
use rr_core::{CoreResult, InterpolatedFrame};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio_util::sync::CancellationToken;

/// State for an active replay session
pub struct ReplaySession {
    replay_id: String,
    created_at: DateTime<Utc>,
    result: OptimizationResponse,
    driver: ProgressDriver,
}

impl ReplaySession {
    /// Start a session for an optimization result. Fails when the result
    /// does not describe a playable route.
    pub fn from_response(result: OptimizationResponse) -> CoreResult<Self> {
        let route = Route::from_response(&result)?;
        let created_at = Utc::now();

        // Compute a replay ID from the route and creation time
        let mut hasher = DefaultHasher::new();
        for point in route.coordinates() {
            point.x.to_bits().hash(&mut hasher);
            point.y.to_bits().hash(&mut hasher);
        }
        route.stops().hash(&mut hasher);
        created_at.timestamp_nanos_opt().hash(&mut hasher);
        let replay_id = format!("{:016x}", hasher.finish());

        Ok(Self {
            replay_id,
            created_at,
            result,
            driver: ProgressDriver::new(route),
        })
    }

    pub fn replay_id(&self) -> &str {
        &self.replay_id
    }

    pub fn result(&self) -> &OptimizationResponse {
        &self.result
    }

    pub fn driver(&self) -> &ProgressDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut ProgressDriver {
        &mut self.driver
    }

    pub fn info(&self) -> ReplayInfo {
        let route = self.driver.route();
        ReplayInfo {
            replay_id: self.replay_id.clone(),
            created_at: self.created_at,
            algorithm_used: self.result.algorithm_used.clone(),
            segments: route.segment_count(),
            route_length: route.length().0,
            route: route.clone(),
            status: self.driver.status(),
            playback: self.driver.state().clone(),
            frame: self.driver.frame(),
        }
    }

    /// Snapshot of the current playback state for subscribers
    pub fn event(&self, newly_visited: Vec<String>) -> FrameEvent {
        let state = self.driver.state();
        FrameEvent {
            timestamp: Utc::now(),
            replay_id: self.replay_id.clone(),
            progress: state.progress,
            status: self.driver.status(),
            speed: state.speed,
            frame: self.driver.frame(),
            visited_stops: state.visited_stops.iter().map(str::to_string).collect(),
            newly_visited,
        }
    }
}

/// Serializable replay info for the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayInfo {
    pub replay_id: String,
    pub created_at: DateTime<Utc>,
    pub algorithm_used: String,
    pub segments: usize,
    pub route_length: f64,
    pub route: Route,
    pub status: PlaybackStatus,
    pub playback: PlaybackState,
    pub frame: InterpolatedFrame,
}

/// One playback update as pushed to stream subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEvent {
    pub timestamp: DateTime<Utc>,
    pub replay_id: String,
    pub progress: f64,
    pub status: PlaybackStatus,
    pub speed: Speed,
    pub frame: InterpolatedFrame,
    pub visited_stops: Vec<String>,
    /// Stops first reached on this update
    pub newly_visited: Vec<String>,
}

/// Cancel the playback timer, if one is running
pub async fn stop_playback_task(state: &AppState) {
    let mut cancel = state.playback_cancel.write().await;
    if let Some(token) = cancel.take() {
        token.cancel();
    }
}

/// Start the playback timer that advances the session and broadcasts frames.
/// Any previous timer is cancelled first.
pub async fn start_playback_task(state: AppState) {
    let cancel_token = {
        let mut cancel = state.playback_cancel.write().await;
        if let Some(token) = cancel.take() {
            token.cancel();
        }
        let new_token = CancellationToken::new();
        *cancel = Some(new_token.clone());
        new_token
    };

    let session = state.session.clone();

    tokio::spawn(async move {
        tracing::info!("Playback task started");

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(TICK_INTERVAL) => {},
            }

            let (event, keep_running) = {
                let mut guard = session.write().await;
                // Re-check under the lock: a control action may have
                // replaced the session while this task was asleep
                if cancel_token.is_cancelled() {
                    break;
                }
                let Some(rs) = guard.as_mut() else {
                    break;
                };
                match rs.driver_mut().advance() {
                    TickOutcome::Stopped => break,
                    TickOutcome::Degenerate => {
                        tracing::warn!("Route {} has nothing to replay", rs.replay_id());
                        break;
                    }
                    TickOutcome::Advanced { newly_visited, .. } => (rs.event(newly_visited), true),
                    TickOutcome::Completed { newly_visited } => {
                        tracing::info!("Replay {} completed", rs.replay_id());
                        (rs.event(newly_visited), false)
                    }
                }
            };

            for stop in &event.newly_visited {
                tracing::debug!("Reached {}", stop);
            }
            state.publish(event);

            if !keep_running {
                break;
            }
        }

        tracing::info!("Playback task ended");
    });
}
