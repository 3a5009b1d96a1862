//! Core error type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("route has {coordinates} coordinate(s); at least 2 are required for playback")]
    DegenerateRoute { coordinates: usize },

    #[error("route has {coordinates} coordinates but {stops} stops; expected {expected} stops")]
    InconsistentRoute {
        coordinates: usize,
        stops: usize,
        expected: usize,
    },

    #[error("unsupported speed multiplier {0}; expected one of 0.5, 1, 1.5, 2, 3")]
    UnsupportedSpeed(f64),

    #[error("unknown algorithm code: {0}")]
    UnknownAlgorithm(String),

    #[error("at least 2 locations are required for optimization (got {0})")]
    TooFewLocations(usize),

    #[error("duplicate location id: {0}")]
    DuplicateLocation(String),

    #[error("{id}: {reason}")]
    InvalidLocation { id: String, reason: String },
}

/// Shorthand result type for `rr-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
