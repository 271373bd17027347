use axum::{
    extract::{rejection::JsonRejection, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::{export_file_name, ExportError, ExportFormat};
use crate::models::StructuredResume;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub resume: StructuredResume,
    #[serde(default)]
    pub job_role: String,
}

/// POST /api/v1/export/:format
pub async fn handle_export(
    Path(format): Path<String>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let format: ExportFormat = format.parse()?;
    let Json(req) = payload?;

    if req.resume.header.name.trim().is_empty() {
        return Err(AppError::Validation("resume.header.name is required".to_string()));
    }

    let file_name = export_file_name(&req.job_role, Utc::now().date_naive(), format);
    let resume = req.resume;
    let bytes = tokio::task::spawn_blocking(move || format.render(&resume))
        .await
        .map_err(|e| match format {
            ExportFormat::Pdf => ExportError::Pdf(e.to_string()),
            ExportFormat::Docx => ExportError::Docx(e.to_string()),
        })??;

    info!("Exported {} ({} bytes) as {}", format, bytes.len(), file_name);

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
