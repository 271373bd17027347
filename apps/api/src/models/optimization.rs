use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted optimization, as stored by the datastore collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OptimizationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub job_description: String,
    pub job_role: String,
    /// The `StructuredResume` as JSON.
    pub optimized_content: Value,
    pub match_score: Option<i32>,
    pub template_name: String,
    pub created_at: DateTime<Utc>,
}
