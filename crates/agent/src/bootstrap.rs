//! Wiring of a configured orchestrator.

use agentura_config::AppConfig;
use agentura_core::error::Error;
use std::sync::Arc;
use tracing::info;

use crate::orchestrator::Orchestrator;

/// Build the model, tool registry, and session store named by `config`
/// and assemble them into an orchestrator.
pub fn build_from_config(config: &AppConfig) -> Result<Orchestrator, Error> {
    let model = agentura_providers::build_from_config(config)?;
    let tools = Arc::new(agentura_tools::default_registry(&config.tools)?);
    let store = agentura_sessions::build_from_config(config);

    info!(tools = tools.len(), store = store.name(), "Orchestrator ready");
    Ok(Orchestrator::new(model, tools, store).with_config(&config.agent))
}
