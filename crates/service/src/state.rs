//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use commerce_gate_engine::CommerceEngine;
use tokio::sync::RwLock;

/// Handle the router clones into every handler. Mutations take the write
/// guard for the duration of the request, reads the read guard.
pub type SharedState = Arc<RwLock<AppState>>;

pub struct AppState {
    pub engine: CommerceEngine,
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine: CommerceEngine::new(),
            started_at: Instant::now(),
        }
    }

    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
