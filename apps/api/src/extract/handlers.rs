use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{extract, UploadedFile, MAX_UPLOAD_BYTES};

/// Multipart framing on top of the file itself; the route's body limit is
/// raised by this much over `MAX_UPLOAD_BYTES` so oversize files reach the
/// extractor's own size check and get a 413 with a JSON body.
pub const UPLOAD_BODY_HEADROOM: usize = 2 * 1024 * 1024;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub format: String,
    pub characters: usize,
}

/// POST /api/v1/extract
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Multipart error", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?;
        upload = Some(UploadedFile {
            file_name,
            media_type,
            bytes,
        });
        break;
    }

    let file = upload
        .ok_or_else(|| AppError::Validation(format!("No '{FILE_FIELD}' field provided")))?;
    let file_name = file.file_name.clone();
    let (kind, text) = extract(file).await?;

    info!("Extracted {} characters from {} ({})", text.chars().count(), file_name, kind);

    Ok(Json(ExtractResponse {
        characters: text.chars().count(),
        format: kind.to_string(),
        text,
    }))
}

/// Bodies past the route limit fail mid-stream; those are size rejections, not bad input.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected by body limit: {e}");
        return AppError::PayloadTooLarge(format!(
            "upload exceeds the limit of {MAX_UPLOAD_BYTES} bytes"
        ));
    }
    AppError::Validation(format!("{context}: {e}"))
}
