use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODELS};

const DEFAULT_FREE_TRIAL_LIMIT: i64 = 3;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent key leaves the service up; optimize answers "misconfigured".
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    /// Candidate models in fallback order.
    pub gemini_models: Vec<String>,
    /// Optimizations allowed per anonymous session.
    pub free_trial_limit: i64,
    /// Include provider error text in the `details` field of 500 responses.
    pub expose_error_details: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            gemini_models: optional_env("GEMINI_MODELS")
                .map(|list| parse_model_list(&list))
                .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()),
            free_trial_limit: optional_env("FREE_TRIAL_LIMIT")
                .map(|v| v.parse::<i64>())
                .transpose()
                .context("FREE_TRIAL_LIMIT must be an integer")?
                .unwrap_or(DEFAULT_FREE_TRIAL_LIMIT),
            expose_error_details: optional_env("EXPOSE_ERROR_DETAILS")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("EXPOSE_ERROR_DETAILS must be true/false")?
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_model_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests; nothing is read from the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost:1/resume_optimizer_test".to_string(),
            gemini_api_key: Some("test-key".to_string()),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            gemini_models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            free_trial_limit: DEFAULT_FREE_TRIAL_LIMIT,
            expose_error_details: false,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}
