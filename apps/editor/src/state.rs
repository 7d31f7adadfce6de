use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::document_client::DocumentService;
use crate::editor::EditorSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one editor session. The mutex serializes edits into a single event queue.
    pub session: Arc<Mutex<EditorSession>>,
    /// Document service client. Swapped for an in-memory double in tests.
    pub docs: Arc<dyn DocumentService>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, docs: Arc<dyn DocumentService>) -> Self {
        Self {
            session: Arc::new(Mutex::new(EditorSession::new(config.initial_container_width))),
            docs,
            config,
        }
    }
}
