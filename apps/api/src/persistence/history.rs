use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::optimization::OptimizationRow;
use crate::models::StructuredResume;

pub const DEFAULT_TEMPLATE: &str = "modern";

/// Parameters for recording a finished optimization.
pub struct NewOptimization<'a> {
    pub user_id: Option<Uuid>,
    pub job_description: &'a str,
    pub job_role: &'a str,
    pub resume: &'a StructuredResume,
    pub template_name: &'a str,
}

pub async fn save_optimization(pool: &PgPool, params: NewOptimization<'_>) -> Result<Uuid> {
    let NewOptimization {
        user_id,
        job_description,
        job_role,
        resume,
        template_name,
    } = params;

    let id = Uuid::new_v4();
    let content = serde_json::to_value(resume)?;
    let match_score = resume.match_score.map(|s| i32::from(s.value()));

    sqlx::query(
        r#"
        INSERT INTO optimizations
            (id, user_id, job_description, job_role, optimized_content,
             match_score, template_name, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(job_description)
    .bind(job_role)
    .bind(&content)
    .bind(match_score)
    .bind(template_name)
    .execute(pool)
    .await?;

    info!("Saved optimization {id} for role '{job_role}'");
    Ok(id)
}

/// A user's optimizations, newest first.
pub async fn list_optimizations(pool: &PgPool, user_id: Uuid) -> Result<Vec<OptimizationRow>> {
    Ok(sqlx::query_as::<_, OptimizationRow>(
        r#"
        SELECT id, user_id, job_description, job_role, optimized_content,
               match_score, template_name, created_at
        FROM optimizations
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Deletes one of the user's optimizations. Returns false when no owned row matched.
pub async fn delete_optimization(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM optimizations WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
