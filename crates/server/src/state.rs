//! Shared handler state.

use std::sync::Arc;
use switchboard_agents::Orchestrator;
use switchboard_core::{AppConfig, AppResult};

/// State cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::new(Orchestrator::from_config(config)?))
    }
}
