//! Interpolation engine
//!
//! Maps a progress value (0-100) onto a route and yields the robot pose for
//! that instant. Every segment gets the same share of progress regardless of
//! its length; within a segment the first 70% is travel and the last 30% is
//! spent loading at the destination stop.
//!
//! `interpolate` is a pure function. It never fails: degenerate routes yield
//! a stationary frame and out-of-range progress is clamped.

use crate::model::{Point, Route};
use crate::units::{Degrees, Percent};
use serde::{Deserialize, Serialize};

/// Share of each segment spent travelling; the remainder is loading.
pub const TRAVEL_SHARE: f64 = 0.7;

/// Largest fraction reported for a segment that is still in progress.
const MAX_OPEN_FRACTION: f64 = 1.0 - f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    #[default]
    Moving,
    Loading,
}

/// Renderable robot state for one progress value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolatedFrame {
    pub position: Point,
    pub heading_degrees: Degrees,
    pub motion_phase: MotionPhase,
    /// Loading completion at the destination; 0 while moving
    pub loading_percent: Percent,
    /// Segment the progress maps to; `None` on degenerate routes
    pub segment_index: Option<usize>,
    /// Position within the segment, in [0, 1) until playback completes
    pub fraction: f64,
    /// Stop at the end of the current segment; `None` once completed
    pub active_stop: Option<String>,
}

impl InterpolatedFrame {
    fn stationary(position: Point) -> Self {
        Self {
            position,
            heading_degrees: Degrees(0.0),
            motion_phase: MotionPhase::Moving,
            loading_percent: Percent::ZERO,
            segment_index: None,
            fraction: 0.0,
            active_stop: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.motion_phase == MotionPhase::Loading
    }
}

/// Split a within-segment fraction into motion phase and loading percentage.
pub fn phase_for_fraction(fraction: f64) -> (MotionPhase, Percent) {
    if fraction < TRAVEL_SHARE {
        (MotionPhase::Moving, Percent::ZERO)
    } else {
        let loading = (fraction - TRAVEL_SHARE) / (1.0 - TRAVEL_SHARE);
        (MotionPhase::Loading, Percent::new(loading * 100.0))
    }
}

/// Compute the frame for `progress` (0-100) along `route`.
pub fn interpolate(route: &Route, progress: f64) -> InterpolatedFrame {
    let coordinates = route.coordinates();
    let total_segments = route.segment_count();

    if total_segments == 0 {
        let anchor = coordinates.first().copied().unwrap_or(Point::ORIGIN);
        return InterpolatedFrame::stationary(anchor);
    }

    let progress = Percent::new(progress);
    let last = total_segments - 1;

    if progress >= Percent::FULL {
        return InterpolatedFrame {
            position: coordinates[total_segments],
            heading_degrees: Degrees(0.0),
            motion_phase: MotionPhase::Moving,
            loading_percent: Percent::ZERO,
            segment_index: Some(last),
            fraction: 1.0,
            active_stop: None,
        };
    }

    let segment_position = progress.as_fraction() * total_segments as f64;
    let segment_index = (segment_position.floor() as usize).min(last);
    let fraction = (segment_position - segment_index as f64).clamp(0.0, MAX_OPEN_FRACTION);

    let start = coordinates[segment_index];
    let end = coordinates[segment_index + 1];
    let (motion_phase, loading_percent) = phase_for_fraction(fraction);

    InterpolatedFrame {
        position: start.lerp(end, fraction),
        heading_degrees: start.heading_to(end),
        motion_phase,
        loading_percent,
        segment_index: Some(segment_index),
        fraction,
        active_stop: route.stops().get(segment_index).cloned(),
    }
}

/// Segment that `progress` falls in; the last segment once playback completes.
pub fn segment_index_at(route: &Route, progress: f64) -> Option<usize> {
    let total_segments = route.segment_count();
    if total_segments == 0 {
        return None;
    }
    let progress = Percent::new(progress);
    let index = (progress.as_fraction() * total_segments as f64).floor() as usize;
    Some(index.min(total_segments - 1))
}

/// Stop that is current at `progress`, without building a whole frame.
pub fn active_stop_at(route: &Route, progress: f64) -> Option<&str> {
    if Percent::new(progress) >= Percent::FULL {
        return None;
    }
    let index = segment_index_at(route, progress)?;
    route.stops().get(index).map(String::as_str)
}
