use std::sync::Arc;

use crate::pipeline::WarlogOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WarlogOrchestrator>,
}
