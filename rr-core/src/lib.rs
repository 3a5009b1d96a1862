//! RobotReplay Core Library
//!
//! This crate provides the route data model, the interpolation engine that
//! turns a progress value into a renderable robot pose, and the progress
//! driver that advances playback on a fixed cadence.

pub mod error;
pub mod interpolate;
pub mod model;
pub mod optimizer;
pub mod playback;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use interpolate::{interpolate, InterpolatedFrame, MotionPhase};
pub use model::{Point, Route, RETURN_TO_START};
pub use optimizer::{OptimizeError, RouteOptimizer};
pub use playback::{PlaybackState, PlaybackStatus, ProgressDriver, Speed, TickOutcome};
