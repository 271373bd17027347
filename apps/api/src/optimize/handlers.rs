use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::StructuredResume;
use crate::optimize::service::{run_optimization, OptimizationJob, OptimizeError};
use crate::persistence::history::DEFAULT_TEMPLATE;
use crate::resilience::classifier::FailureCategory;
use crate::resilience::to_user_message;
use crate::session::SessionContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
}

impl OptimizeRequest {
    fn into_job(self) -> Result<OptimizationJob, AppError> {
        let mut missing = Vec::new();
        let mut required = |value: Option<String>, field: &'static str| {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(field);
                    String::new()
                }
            }
        };

        let resume_text = required(self.resume_text, "resumeText");
        let job_description = required(self.job_description, "jobDescription");
        let job_role = required(self.job_role, "jobRole");

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(OptimizationJob {
            resume_text,
            job_description,
            job_role: job_role.trim().to_string(),
            template_name: self
                .template_name
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        })
    }
}

/// POST /api/v1/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    session: SessionContext,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<StructuredResume>, AppError> {
    let Json(req) = payload?;
    let job = req.into_job()?;

    run_optimization(&state, &session, job)
        .await
        .map(Json)
        .map_err(|e| into_app_error(e, state.config.expose_error_details))
}

fn into_app_error(err: OptimizeError, expose_details: bool) -> AppError {
    let details = expose_details.then(|| err.to_string());
    match err {
        OptimizeError::MissingSession => {
            AppError::Validation(OptimizeError::MissingSession.to_string())
        }
        OptimizeError::TrialLimitReached { limit } => AppError::TrialLimitReached { limit },
        OptimizeError::Provider(LlmError::NotConfigured(reason)) => AppError::Misconfigured(reason),
        OptimizeError::Provider(e) => AppError::Provider {
            message: to_user_message(&e).to_string(),
            details,
        },
        OptimizeError::Normalize(_) => AppError::Provider {
            message: FailureCategory::Unknown.user_message().to_string(),
            details,
        },
    }
}
