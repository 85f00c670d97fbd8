use std::sync::Arc;

use crate::config::Config;
use crate::email::Mailer;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion provider. Default: `LlmClient`.
    pub llm: Arc<dyn CompletionProvider>,
    /// Outbound mail transport. Default: `SmtpMailer`.
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}
