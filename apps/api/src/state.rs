use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::ModelInvoker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Retry + model fallback in front of the provider client.
    pub invoker: Arc<ModelInvoker>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State over a scripted provider and an unreachable database.
    pub fn for_tests(provider: Arc<dyn crate::llm_client::ModelProvider>) -> Self {
        let config = Config::for_tests();
        AppState {
            db: crate::db::test_pool(),
            invoker: Arc::new(ModelInvoker::new(provider, config.gemini_models.clone())),
            config,
        }
    }
}
