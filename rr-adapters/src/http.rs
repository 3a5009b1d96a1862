//! Client for the remote optimization service
//!
//! Sends `POST {base}/optimize` with the locations and algorithm code and
//! accepts the answer only if it describes a playable route.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use rr_core::model::{OptimizationRequest, OptimizationResponse, Route};
use rr_core::optimizer::{OptimizeError, RouteOptimizer};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Shown when the service rejects a request without saying why
const DEFAULT_FAILURE: &str = "Optimization failed";

/// Error body of the service; `detail` is a string or a list of field errors
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

pub struct HttpOptimizer {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpOptimizer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            endpoint: format!("{}/optimize", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResponse, OptimizeError> {
        request.validate()?;

        info!(
            "Requesting {} route for {} locations from {}",
            request.algorithm,
            request.locations.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| OptimizeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(ErrorBody::message)
                .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            warn!("Optimization service returned {}: {}", status, detail);
            return Err(OptimizeError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .json::<OptimizationResponse>()
            .await
            .map_err(|e| OptimizeError::Malformed(e.to_string()))?;

        // Reject here so a half-usable body never reaches playback
        Route::from_response(&body).map_err(|e| OptimizeError::Malformed(e.to_string()))?;

        Ok(body)
    }
}

impl RouteOptimizer for HttpOptimizer {
    fn name(&self) -> &str {
        "http"
    }

    fn optimize<'a>(
        &'a self,
        request: &'a OptimizationRequest,
    ) -> BoxFuture<'a, Result<OptimizationResponse, OptimizeError>> {
        Box::pin(self.request(request))
    }
}
