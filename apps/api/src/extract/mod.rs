//! File Text Extractor — uploaded bytes in, plain text out.
//!
//! Dispatch is a closed set of document kinds chosen from the declared media
//! type, falling back to the file extension. The size guard runs before any
//! decoder sees the bytes. PDF and DOCX decoding is CPU-bound and runs on the
//! blocking pool.

pub mod handlers;

use std::fmt;

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;
use tracing::debug;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const PDF_MEDIA_TYPE: &str = "application/pdf";
const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const TEXT_MEDIA_TYPE: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported file type '{0}'; allowed formats: PDF, DOCX, TXT")]
    UnsupportedFormat(String),

    #[error("could not read {kind} file: {message}")]
    Decode { kind: DocumentKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
    Unsupported(String),
}

impl DocumentKind {
    /// Media type wins when it names a known kind; generic or missing types
    /// fall back to the extension.
    pub fn detect(media_type: Option<&str>, file_name: &str) -> Self {
        let media_type = media_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some(PDF_MEDIA_TYPE) => return DocumentKind::Pdf,
            Some(DOCX_MEDIA_TYPE) => return DocumentKind::Docx,
            Some(TEXT_MEDIA_TYPE) => return DocumentKind::PlainText,
            _ => {}
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" => DocumentKind::Docx,
            "txt" => DocumentKind::PlainText,
            _ => DocumentKind::Unsupported(
                media_type
                    .filter(|m| !m.is_empty() && m != "application/octet-stream")
                    .unwrap_or_else(|| {
                        if extension.is_empty() {
                            file_name.to_string()
                        } else {
                            format!(".{extension}")
                        }
                    }),
            ),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("PDF"),
            DocumentKind::Docx => f.write_str("DOCX"),
            DocumentKind::PlainText => f.write_str("TXT"),
            DocumentKind::Unsupported(label) => write!(f, "unsupported ({label})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::detect(self.media_type.as_deref(), &self.file_name)
    }
}

/// Extracts the text of an uploaded file, returning it with the detected kind.
pub async fn extract(file: UploadedFile) -> Result<(DocumentKind, String), ExtractError> {
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ExtractError::TooLarge {
            size: file.bytes.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let kind = file.kind();
    debug!("Extracting {} ({} bytes) as {}", file.file_name, file.bytes.len(), kind);

    let text = match &kind {
        DocumentKind::Unsupported(label) => {
            return Err(ExtractError::UnsupportedFormat(label.clone()));
        }
        DocumentKind::PlainText => String::from_utf8_lossy(&file.bytes).into_owned(),
        DocumentKind::Pdf => {
            let bytes = file.bytes;
            decode_blocking(DocumentKind::Pdf, move || {
                pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
            })
            .await?
        }
        DocumentKind::Docx => {
            let bytes = file.bytes;
            decode_blocking(DocumentKind::Docx, move || {
                docx_text(&bytes).map_err(|e| e.to_string())
            })
            .await?
        }
    };

    Ok((kind, text))
}

async fn decode_blocking<F>(kind: DocumentKind, decode: F) -> Result<String, ExtractError>
where
    F: FnOnce() -> Result<String, String> + Send + 'static,
{
    match tokio::task::spawn_blocking(decode).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(message)) => Err(ExtractError::Decode { kind, message }),
        Err(join_error) => Err(ExtractError::Decode {
            kind,
            message: join_error.to_string(),
        }),
    }
}

/// Reads the body text of a DOCX package, one line per paragraph.
pub fn docx_text(bytes: &[u8]) -> Result<String, docx_rs::ReaderError> {
    let docx = docx_rs::read_docx(bytes)?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(
                paragraph
                    .children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(run_text(&run.children)),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn run_text(children: &[RunChild]) -> String {
    children
        .iter()
        .filter_map(|rc| match rc {
            RunChild::Text(t) => Some(t.text.as_str()),
            RunChild::Tab(_) => Some("\t"),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks::fixtures::full_resume;
    use crate::export::docx::render_docx;

    fn upload(name: &str, media_type: Option<&str>, bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            media_type: media_type.map(str::to_string),
            bytes: Bytes::from(bytes),
        }
    }

    #[test]
    fn test_detect_by_media_type() {
        assert_eq!(DocumentKind::detect(Some("application/pdf"), "x"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::detect(Some(DOCX_MEDIA_TYPE), "x"), DocumentKind::Docx);
        assert_eq!(
            DocumentKind::detect(Some("text/plain; charset=utf-8"), "x"),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), "CV.PDF"),
            DocumentKind::Pdf
        );
        assert_eq!(DocumentKind::detect(None, "resume.docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::detect(None, "notes.txt"), DocumentKind::PlainText);
    }

    #[test]
    fn test_detect_unsupported_names_the_input() {
        assert_eq!(
            DocumentKind::detect(Some("image/png"), "photo.png"),
            DocumentKind::Unsupported("image/png".into())
        );
        assert_eq!(
            DocumentKind::detect(None, "resume.odt"),
            DocumentKind::Unsupported(".odt".into())
        );
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_before_decoding() {
        // Not a valid PDF: reaching the decoder would produce a Decode error instead.
        let file = upload("resume.pdf", Some("application/pdf"), vec![0u8; 11 * 1024 * 1024]);
        let err = extract(file).await.unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { limit: MAX_UPLOAD_BYTES, .. }));
    }

    #[tokio::test]
    async fn test_unsupported_format_names_allowed_set() {
        let err = extract(upload("photo.png", Some("image/png"), vec![1, 2, 3]))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("image/png"));
        assert!(message.contains("PDF, DOCX, TXT"));
    }

    #[tokio::test]
    async fn test_plain_text_is_decoded_lossily() {
        let mut bytes = "John Doe\nSenior Developer".as_bytes().to_vec();
        bytes.push(0xff);
        let (kind, text) = extract(upload("cv.txt", None, bytes)).await.unwrap();
        assert_eq!(kind, DocumentKind::PlainText);
        assert!(text.starts_with("John Doe\nSenior Developer"));
    }

    #[tokio::test]
    async fn test_docx_text_round_trips_through_exporter() {
        let bytes = render_docx(&full_resume()).unwrap();
        let (kind, text) = extract(upload("cv.docx", None, bytes)).await.unwrap();
        assert_eq!(kind, DocumentKind::Docx);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Jane Doe");
        assert!(lines.contains(&"Senior Backend Engineer - Acme Corp"));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_decode_error() {
        let err = extract(upload("cv.pdf", None, b"definitely not a pdf".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Decode { kind: DocumentKind::Pdf, .. }));
    }
}
