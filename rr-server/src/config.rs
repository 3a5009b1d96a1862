//! Server configuration from environment variables
//!
//! - `RR_BIND`: listen address (default `0.0.0.0:9100`)
//! - `RR_OPTIMIZER_URL`: base URL of the optimization service; when unset the
//!   built-in demo optimizer is used
//! - `RR_OPTIMIZER_TIMEOUT_SECS`: request timeout for the service (default 60)

use anyhow::{bail, Context, Result};
use rr_adapters::{DemoOptimizer, HttpOptimizer};
use rr_core::RouteOptimizer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:9100";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq)]
pub enum OptimizerBackend {
    Http { url: String },
    Demo,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub optimizer: OptimizerBackend,
    pub optimizer_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_raw = lookup("RR_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .with_context(|| format!("RR_BIND is not a socket address: {}", bind_raw))?;

        let optimizer = match lookup("RR_OPTIMIZER_URL").map(|u| u.trim().to_string()) {
            Some(url) if !url.is_empty() => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    bail!("RR_OPTIMIZER_URL must start with http:// or https://, got {}", url);
                }
                OptimizerBackend::Http { url }
            }
            _ => OptimizerBackend::Demo,
        };

        let optimizer_timeout = match lookup("RR_OPTIMIZER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("RR_OPTIMIZER_TIMEOUT_SECS is not a number: {}", raw))?;
                if secs == 0 {
                    bail!("RR_OPTIMIZER_TIMEOUT_SECS must be at least 1");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            bind,
            optimizer,
            optimizer_timeout,
        })
    }

    pub fn build_optimizer(&self) -> Result<Arc<dyn RouteOptimizer>> {
        Ok(match &self.optimizer {
            OptimizerBackend::Http { url } => {
                Arc::new(HttpOptimizer::new(url, self.optimizer_timeout)?)
            }
            OptimizerBackend::Demo => Arc::new(DemoOptimizer::new()),
        })
    }
}
