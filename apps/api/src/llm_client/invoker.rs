//! Model Invoker — prompt in, raw model text out.
//!
//! Candidate models are tried in order inside one attempt: a "model not found"
//! failure moves on to the next candidate, anything else ends the attempt.
//! The whole candidate walk runs under the retry engine, guarded by the
//! error classifier.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::llm_client::prompts::build_optimization_prompt;
use crate::llm_client::{LlmError, ModelProvider};
use crate::resilience::{execute, is_retryable, RetryPolicy};

pub const MAX_ATTEMPTS: u32 = 3;
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn ModelProvider>,
    models: Vec<String>,
    max_attempts: u32,
    base_delay: Duration,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn ModelProvider>, models: Vec<String>) -> Self {
        Self {
            provider,
            models,
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Sends the optimization prompt and returns the model's raw text.
    pub async fn optimize(
        &self,
        resume_text: &str,
        job_description: &str,
        job_role: &str,
    ) -> Result<String, LlmError> {
        self.optimize_with_progress(resume_text, job_description, job_role, |_, _, _| {})
            .await
    }

    /// Like `optimize`, reporting `(attempt, max_attempts, error)` before each retry.
    pub async fn optimize_with_progress<P>(
        &self,
        resume_text: &str,
        job_description: &str,
        job_role: &str,
        on_retry: P,
    ) -> Result<String, LlmError>
    where
        P: Fn(u32, u32, &LlmError) + Send + Sync,
    {
        let prompt = build_optimization_prompt(resume_text, job_description, job_role);
        let max_attempts = self.max_attempts;

        let policy = RetryPolicy::new(max_attempts, self.base_delay)
            .retry_if(|e: &LlmError| is_retryable(e))
            .on_retry(|attempt, e: &LlmError| {
                warn!("Retrying optimization ({}/{}): {}", attempt, max_attempts, e);
                on_retry(attempt, max_attempts, e);
            });

        execute(&policy, || self.invoke_candidates(&prompt)).await
    }

    async fn invoke_candidates(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last_error = None;

        for (index, model) in self.models.iter().enumerate() {
            match self.provider.generate(model, prompt).await {
                Ok(text) => {
                    if index > 0 {
                        info!("Fallback model {} answered", model);
                    }
                    return Ok(text);
                }
                Err(e) if e.is_model_unavailable() => {
                    warn!("Model {} unavailable, trying next candidate: {}", model, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::NotConfigured("no candidate models configured".into())))
    }
}

/// Scripted providers for tests across the crate.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, ModelProvider};

    pub type Reply = Result<String, LlmError>;

    /// Replays queued replies in order and records `(model, prompt)` for each call.
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn models_called(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(m, _)| m.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::NotConfigured("script exhausted".into())))
        }
    }

    pub fn server_error() -> Reply {
        Err(LlmError::Api {
            status: 500,
            message: "Internal error encountered.".to_string(),
        })
    }

    pub fn model_not_found(model: &str) -> Reply {
        Err(LlmError::Api {
            status: 404,
            message: format!("models/{model} is not found for API version v1beta"),
        })
    }
}
