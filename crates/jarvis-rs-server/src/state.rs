//! Shared handler state.

use jarvis_rs_core::Orchestrator;

/// State shared by every route.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}
