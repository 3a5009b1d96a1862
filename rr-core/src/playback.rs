//! Progress driver: playback state and transport controls
//!
//! The driver owns the route of a playback session together with its
//! `PlaybackState`. A timer calls [`ProgressDriver::advance`] every
//! [`TICK_INTERVAL`]; everything else (play, pause, reset, speed) is an
//! operator-triggered transition. The driver is the only writer of the state.

use crate::error::{CoreError, CoreResult};
use crate::interpolate::{active_stop_at, interpolate, segment_index_at, InterpolatedFrame};
use crate::model::Route;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Progress gained per tick at 1x speed, in percentage points.
pub const BASE_INCREMENT: f64 = 0.5;

/// Wall-clock cadence of the playback timer (~60Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Playback speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Speed {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
    Triple,
}

impl Speed {
    pub const ALL: [Speed; 5] = [
        Speed::Half,
        Speed::Normal,
        Speed::OneAndHalf,
        Speed::Double,
        Speed::Triple,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            Speed::Half => 0.5,
            Speed::Normal => 1.0,
            Speed::OneAndHalf => 1.5,
            Speed::Double => 2.0,
            Speed::Triple => 3.0,
        }
    }
}

impl TryFrom<f64> for Speed {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Speed::ALL
            .into_iter()
            .find(|s| s.multiplier() == value)
            .ok_or(CoreError::UnsupportedSpeed(value))
    }
}

impl From<Speed> for f64 {
    fn from(speed: Speed) -> Self {
        speed.multiplier()
    }
}

/// Advance `previous` by one tick at `speed`, capped at 100.
pub fn tick(previous: f64, speed: Speed) -> f64 {
    (previous.max(0.0) + BASE_INCREMENT * speed.multiplier()).min(100.0)
}

/// Stops reached so far, in discovery order, each listed once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VisitedStops(Vec<String>);

impl VisitedStops {
    /// Record `stop`; returns true the first time it is seen.
    pub fn insert(&mut self, stop: &str) -> bool {
        if self.contains(stop) {
            return false;
        }
        self.0.push(stop.to_string());
        true
    }

    pub fn contains(&self, stop: &str) -> bool {
        self.0.iter().any(|s| s == stop)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Where a playback run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Mutable playback state of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub progress: f64,
    pub playing: bool,
    pub speed: Speed,
    pub visited_stops: VisitedStops,
    pub active_stop: Option<String>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            playing: false,
            speed: Speed::Normal,
            visited_stops: VisitedStops::default(),
            active_stop: None,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.progress >= 100.0 {
            PlaybackStatus::Completed
        } else if self.playing {
            PlaybackStatus::Playing
        } else if self.progress <= 0.0 {
            PlaybackStatus::Idle
        } else {
            PlaybackStatus::Paused
        }
    }

    /// Back to the start of the run; speed is kept.
    fn rewind(&mut self) {
        self.progress = 0.0;
        self.visited_stops.clear();
        self.active_stop = None;
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one timer tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing changed
    Stopped,
    /// Route has no segment to travel; playback was halted
    Degenerate,
    /// Progress moved forward
    Advanced {
        progress: f64,
        newly_visited: Vec<String>,
    },
    /// Progress reached 100 on this tick; playback stopped
    Completed { newly_visited: Vec<String> },
}

impl TickOutcome {
    /// True when the timer should keep firing
    pub fn keeps_running(&self) -> bool {
        matches!(self, TickOutcome::Advanced { .. })
    }
}

/// Owns a route and advances its playback state
#[derive(Debug, Clone)]
pub struct ProgressDriver {
    route: Route,
    state: PlaybackState,
}

impl ProgressDriver {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            state: PlaybackState::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// Frame for the current progress
    pub fn frame(&self) -> InterpolatedFrame {
        interpolate(&self.route, self.state.progress)
    }

    /// Start or resume. Resuming a completed run replays it from the start.
    pub fn play(&mut self) -> CoreResult<()> {
        if self.route.is_degenerate() {
            return Err(CoreError::DegenerateRoute {
                coordinates: self.route.coordinates().len(),
            });
        }
        if self.state.status() == PlaybackStatus::Completed {
            debug!("Replaying completed run from the start");
            self.state.rewind();
        }
        self.state.playing = true;
        debug!(
            progress = self.state.progress,
            speed = self.state.speed.multiplier(),
            "Playback started"
        );
        Ok(())
    }

    pub fn pause(&mut self) {
        self.state.playing = false;
        debug!(progress = self.state.progress, "Playback paused");
    }

    /// Flip between playing and paused; returns whether playback is now running.
    pub fn toggle(&mut self) -> CoreResult<bool> {
        if self.state.playing {
            self.pause();
        } else {
            self.play()?;
        }
        Ok(self.state.playing)
    }

    /// Stop and rewind to progress 0, whatever the current state.
    pub fn reset(&mut self) {
        self.state.playing = false;
        self.state.rewind();
        debug!("Playback reset");
    }

    /// Applies from the next tick on.
    pub fn set_speed(&mut self, speed: Speed) {
        self.state.speed = speed;
        debug!(speed = speed.multiplier(), "Playback speed changed");
    }

    /// Swap in a new route. Always resets, so no visited stop of the old
    /// route survives.
    pub fn replace_route(&mut self, route: Route) {
        self.route = route;
        self.reset();
    }

    /// One timer tick.
    pub fn advance(&mut self) -> TickOutcome {
        if !self.state.playing {
            return TickOutcome::Stopped;
        }
        if self.route.is_degenerate() {
            self.state.playing = false;
            return TickOutcome::Degenerate;
        }

        let previous = self.state.progress;
        let next = tick(previous, self.state.speed);
        self.state.progress = next;

        // A fast tick over a short segment may skip it entirely; every
        // segment entered since the last tick counts as visited.
        let mut newly_visited = Vec::new();
        if let (Some(from), Some(to)) = (
            segment_index_at(&self.route, previous),
            segment_index_at(&self.route, next),
        ) {
            for stop in &self.route.stops()[from..=to] {
                if self.state.visited_stops.insert(stop) {
                    newly_visited.push(stop.clone());
                }
            }
        }

        if next >= 100.0 {
            self.state.playing = false;
            self.state.active_stop = None;
            debug!(visited = self.state.visited_stops.len(), "Playback completed");
            return TickOutcome::Completed { newly_visited };
        }

        self.state.active_stop = active_stop_at(&self.route, next).map(str::to_string);
        TickOutcome::Advanced {
            progress: next,
            newly_visited,
        }
    }
}
