//! Session store implementations for Agentura.

pub mod file_store;
pub mod in_memory;

pub use file_store::FileSessionStore;
pub use in_memory::InMemorySessionStore;

use agentura_config::AppConfig;
use agentura_core::session::SessionStore;
use std::sync::Arc;
use tracing::info;

/// Build the store selected by `[sessions] backend`.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn SessionStore> {
    match config.sessions.backend.as_str() {
        "memory" => {
            info!("Using in-memory session store; transcripts are not persisted");
            Arc::new(InMemorySessionStore::new())
        }
        _ => {
            let dir = config.sessions_dir();
            info!(dir = %dir.display(), "Using file session store");
            Arc::new(FileSessionStore::new(dir))
        }
    }
}
