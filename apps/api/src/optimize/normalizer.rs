//! Response Normalizer — turns free-form model output into a `StructuredResume`.
//!
//! Two steps, kept separate so failures are reported precisely:
//! 1. `parse` — find the JSON candidate (first fenced block, else the whole
//!    text) and parse it strictly.
//! 2. `validate` — deserialize the parsed value into `StructuredResume`,
//!    rejecting missing headers, wrong types and out-of-range scores.
//!
//! Neither step retries; the retry budget is spent at the invocation layer.

use serde_json::Value;
use thiserror::Error;

use crate::models::StructuredResume;

const FENCE: &str = "```";

#[derive(Debug, Error)]
#[error("model output is not valid JSON: {source}")]
pub struct ParseError {
    /// The unmodified model output, kept for diagnostics only.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("model output does not match the resume schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("resume header has an empty name")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Returns the interior of the first fenced block, or the whole text when
/// there is none. An unterminated fence yields everything after it.
pub fn extract_candidate(raw: &str) -> &str {
    let Some(open) = raw.find(FENCE) else {
        return raw.trim();
    };

    let after_fence = &raw[open + FENCE.len()..];
    // Skip an info string such as `json` or `JSON`.
    let body = after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric());

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

pub fn parse(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(extract_candidate(raw)).map_err(|source| ParseError {
        raw: raw.to_string(),
        source,
    })
}

pub fn validate(value: Value) -> Result<StructuredResume, ValidationError> {
    let resume: StructuredResume = serde_json::from_value(value)?;
    if resume.header.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(resume)
}

pub fn normalize(raw: &str) -> Result<StructuredResume, NormalizeError> {
    Ok(validate(parse(raw)?)?)
}
