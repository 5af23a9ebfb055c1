use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatCompleter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable configuration and the provider client; generated
/// reports are never stored here.
#[derive(Clone)]
pub struct AppState {
    /// Completion provider. Default: `LlmClient`; tests inject a stub.
    pub completer: Arc<dyn ChatCompleter>,
    pub config: Config,
}
