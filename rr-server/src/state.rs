//! Application state management

use crate::replay::{FrameEvent, ReplaySession};
use rr_adapters::DemoOptimizer;
use rr_core::RouteOptimizer;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Where routes come from
    pub optimizer: Arc<dyn RouteOptimizer>,

    /// Active replay session (None until a route has been optimized)
    pub session: Arc<RwLock<Option<ReplaySession>>>,

    /// Cancellation token for the playback timer task
    pub playback_cancel: Arc<RwLock<Option<CancellationToken>>>,

    /// Broadcast channel for playback frames
    /// Multiple consumers can subscribe to receive frames
    pub frame_tx: broadcast::Sender<FrameEvent>,
}

impl AppState {
    pub fn new(optimizer: Arc<dyn RouteOptimizer>) -> Self {
        // Capacity covers ~4s of ticks at 60Hz
        let (frame_tx, _) = broadcast::channel(256);

        Self {
            optimizer,
            session: Arc::new(RwLock::new(None)),
            playback_cancel: Arc::new(RwLock::new(None)),
            frame_tx,
        }
    }

    /// Subscribe to playback frames
    pub fn subscribe(&self) -> broadcast::Receiver<FrameEvent> {
        self.frame_tx.subscribe()
    }

    /// Send a frame to subscribers; dropped when nobody listens
    pub fn publish(&self, event: FrameEvent) {
        let _ = self.frame_tx.send(event);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(DemoOptimizer::new()))
    }
}
