//! Route optimizer trait definition

use crate::error::CoreError;
use crate::model::{OptimizationRequest, OptimizationResponse};
use futures::future::BoxFuture;
use thiserror::Error;

/// Why an optimization attempt produced no route
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The request failed local validation and was never sent
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The service answered with a non-success status
    #[error("optimization service returned {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The service could not be reached
    #[error("could not reach optimization service: {0}")]
    Transport(String),

    /// The service answered with a body that is not a usable route
    #[error("malformed optimization response: {0}")]
    Malformed(String),
}

/// Source of optimized routes
///
/// Implementations:
/// - forward the request to the remote optimization service, or
/// - produce a route locally (demo / offline use)
///
/// The trait is object safe so the server can hold an `Arc<dyn RouteOptimizer>`.
pub trait RouteOptimizer: Send + Sync {
    /// Get the name of this optimizer (e.g., "http", "demo")
    fn name(&self) -> &str;

    /// Compute a route for `request`.
    ///
    /// Returns:
    /// - `Ok(response)` with at least the `route` and `coordinates` fields
    /// - `Err(_)` if the request was rejected or the service is unavailable
    ///
    /// No retry is attempted; the caller decides what to do on failure.
    fn optimize<'a>(
        &'a self,
        request: &'a OptimizationRequest,
    ) -> BoxFuture<'a, Result<OptimizationResponse, OptimizeError>>;
}
