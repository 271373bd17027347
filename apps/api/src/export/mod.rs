// Document export: the block plan is built once and rendered by either codec.
// Rendering is CPU-bound; handlers run it inside tokio::task::spawn_blocking.

pub mod blocks;
pub mod docx;
pub mod font_metrics;
pub mod handlers;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::StructuredResume;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("unsupported export format '{0}' (expected pdf or docx)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn render(self, resume: &StructuredResume) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Pdf => pdf::render_pdf(resume),
            ExportFormat::Docx => docx::render_docx(resume),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => f.write_str("PDF"),
            ExportFormat::Docx => f.write_str("DOCX"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// `optimized-cv-<role with whitespace runs as hyphens>-<YYYY-MM-DD>.<ext>`.
///
/// An empty role drops its segment.
pub fn export_file_name(job_role: &str, date: NaiveDate, format: ExportFormat) -> String {
    let role = job_role.split_whitespace().collect::<Vec<_>>().join("-");
    let date = date.format("%Y-%m-%d");
    if role.is_empty() {
        format!("optimized-cv-{date}.{}", format.extension())
    } else {
        format!("optimized-cv-{role}-{date}.{}", format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks::fixtures::full_resume;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_file_name_replaces_spaces_with_hyphens() {
        assert_eq!(
            export_file_name("Senior Backend  Developer", date(), ExportFormat::Pdf),
            "optimized-cv-Senior-Backend-Developer-2024-03-09.pdf"
        );
    }

    #[test]
    fn test_file_name_for_docx() {
        assert_eq!(
            export_file_name("Backend Developer", date(), ExportFormat::Docx),
            "optimized-cv-Backend-Developer-2024-03-09.docx"
        );
    }

    #[test]
    fn test_file_name_without_role() {
        assert_eq!(
            export_file_name("  ", date(), ExportFormat::Pdf),
            "optimized-cv-2024-03-09.pdf"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("docx".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert!("txt".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_both_formats_render_full_resume() {
        for format in [ExportFormat::Pdf, ExportFormat::Docx] {
            let bytes = format.render(&full_resume()).unwrap();
            assert!(!bytes.is_empty(), "{format} output should not be empty");
        }
    }
}
