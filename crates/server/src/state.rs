use std::sync::Arc;
use rtw_core::{Config, SanitizedConfig, Workflow};

/// Shared application state
pub struct AppState {
    config: Config,
    workflow: Arc<Workflow>,
}

impl AppState {
    pub fn new(config: Config, workflow: Arc<Workflow>) -> Self {
        Self { config, workflow }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn workflow(&self) -> &Workflow {
        self.workflow.as_ref()
    }
}
