use std::sync::Arc;

use crate::conversation::state::SessionStore;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-generation capability. Production: `LlmClient`.
    pub llm: Arc<dyn TextGenerator>,
    pub sessions: SessionStore,
}
