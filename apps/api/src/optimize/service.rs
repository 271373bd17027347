//! Optimization pipeline: trial gate → model invocation → normalization →
//! detached bookkeeping.
//!
//! Usage tracking and history persistence never fail the request. Their
//! errors are logged and dropped, and both run after the response is ready.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::llm_client::LlmError;
use crate::models::StructuredResume;
use crate::optimize::normalizer::{self, NormalizeError};
use crate::persistence::history::{self, NewOptimization};
use crate::persistence::usage::{self, UsageSummary};
use crate::session::SessionContext;
use crate::state::AppState;

/// Raw model output is logged up to this many characters on parse failure.
const RAW_LOG_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("an x-session-id or x-user-id header is required")]
    MissingSession,

    #[error("free trial limit of {limit} optimizations reached")]
    TrialLimitReached { limit: i64 },

    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// One optimization request after input validation.
#[derive(Debug, Clone)]
pub struct OptimizationJob {
    pub resume_text: String,
    pub job_description: String,
    pub job_role: String,
    pub template_name: String,
}

pub async fn run_optimization(
    state: &AppState,
    session: &SessionContext,
    job: OptimizationJob,
) -> Result<StructuredResume, OptimizeError> {
    if session.is_anonymous() {
        let key = session.usage_key().ok_or(OptimizeError::MissingSession)?;
        let count = usage::get_usage_count(&state.db, &key).await;
        check_trial_allowance(&key, count, state.config.free_trial_limit)?;
    }

    let raw = state
        .invoker
        .optimize_with_progress(
            &job.resume_text,
            &job.job_description,
            &job.job_role,
            |attempt, max_attempts, _| {
                info!(
                    "Optimizing resume for role '{}': retrying ({}/{})",
                    job.job_role, attempt, max_attempts
                );
            },
        )
        .await?;

    let resume = normalize_output(&raw)?;
    info!(
        "Optimized resume for role '{}' (match score: {:?})",
        job.job_role,
        resume.match_score.map(|s| s.value())
    );

    record_detached(state, session, job, resume.clone());
    Ok(resume)
}

/// A failed counter read allows the request; the trial gate is best effort.
fn check_trial_allowance(key: &str, count: Result<i64>, limit: i64) -> Result<(), OptimizeError> {
    match count.map(|count| UsageSummary::new(count, Some(limit))) {
        Ok(usage) if usage.is_exhausted() => {
            let count = usage.count;
            info!("Trial limit reached for {key} ({count}/{limit})");
            Err(OptimizeError::TrialLimitReached { limit })
        }
        Ok(usage) => {
            debug!("Trial usage for {key}: {}/{limit}", usage.count);
            Ok(())
        }
        Err(e) => {
            warn!("Could not read usage for {key}, allowing request: {e:#}");
            Ok(())
        }
    }
}

fn normalize_output(raw: &str) -> Result<StructuredResume, NormalizeError> {
    let value = normalizer::parse(raw).map_err(|e| {
        error!(
            "Model output could not be parsed ({}); raw output: {}",
            e.source,
            truncate(&e.raw, RAW_LOG_LIMIT)
        );
        e
    })?;

    normalizer::validate(value).map_err(|e| {
        error!("Model output failed validation: {e}");
        NormalizeError::from(e)
    })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Increments the caller's counter and saves the result without holding up the response.
fn record_detached(
    state: &AppState,
    session: &SessionContext,
    job: OptimizationJob,
    resume: StructuredResume,
) {
    let db = state.db.clone();
    let usage_key = session.usage_key();
    let user_id = session.user_id;

    tokio::spawn(async move {
        if let Some(key) = usage_key {
            match usage::increment_usage(&db, &key).await {
                Ok(count) => debug!("Usage for {key} is now {count}"),
                Err(e) => warn!("Failed to increment usage for {key}: {e:#}"),
            }
        }

        let saved = history::save_optimization(
            &db,
            NewOptimization {
                user_id,
                job_description: &job.job_description,
                job_role: &job.job_role,
                resume: &resume,
                template_name: &job.template_name,
            },
        )
        .await;
        if let Err(e) = saved {
            warn!("Failed to save optimization history: {e:#}");
        }
    });
}
