//! Upload form intake and the notification/analytics wrapper around the
//! analysis flow.

use axum::extract::Multipart;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::flow::{
    AnalysisOutcome, AnalyzeError, AnalyzeRequest, ProgressSink, ResumeAnalyzer, ResumeFile,
};
use crate::analytics;
use crate::auth::Session;
use crate::errors::AppError;
use crate::notifications::NotificationCenter;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// The four fields of the upload form. Blank text fields are `None`.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("no file was uploaded")]
    NoFile,

    #[error("'{0}' is not a PDF")]
    NotPdf(String),

    #[error("the uploaded file is empty")]
    Empty,

    #[error("file is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },
}

impl UploadRejection {
    pub fn notice(&self) -> (&'static str, String) {
        match self {
            UploadRejection::NoFile => (
                "No File Selected",
                "Please upload a resume file before analyzing.".to_string(),
            ),
            UploadRejection::TooLarge { max, .. } => (
                "File Too Large",
                format!("Resumes can be at most {} MB.", max / (1024 * 1024)),
            ),
            UploadRejection::NotPdf(_) | UploadRejection::Empty => (
                "Invalid File",
                "Please upload a valid PDF file.".to_string(),
            ),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the multipart body. Unknown fields are drained and ignored; a
/// second `file` part replaces the first.
pub async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company-name" | "job-title" | "job-description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable field {name}: {e}")))?;
                let value = non_blank(text);
                match name.as_str() {
                    "company-name" => form.company_name = value,
                    "job-title" => form.job_title = value,
                    _ => form.job_description = value,
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                // An empty file input still sends a nameless, empty part.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable field {name}: {e}")))?;
                debug!("Ignored upload field {name:?}");
            }
        }
    }
    Ok(form)
}

/// Accepts exactly one non-empty PDF no larger than `max_bytes`.
pub fn validate_pdf(file: Option<UploadedFile>, max_bytes: usize) -> Result<ResumeFile, UploadRejection> {
    let file = file.ok_or(UploadRejection::NoFile)?;
    let named_pdf = file.file_name.to_ascii_lowercase().ends_with(".pdf");
    let typed_pdf = file.content_type.as_deref() == Some("application/pdf");
    if !named_pdf && !typed_pdf {
        return Err(UploadRejection::NotPdf(file.file_name));
    }
    if file.bytes.is_empty() {
        return Err(UploadRejection::Empty);
    }
    if file.bytes.len() > max_bytes {
        return Err(UploadRejection::TooLarge {
            size: file.bytes.len(),
            max: max_bytes,
        });
    }
    if !file.bytes.starts_with(PDF_MAGIC) {
        return Err(UploadRejection::NotPdf(file.file_name));
    }

    let file_name = if named_pdf {
        file.file_name
    } else {
        format!("{}.pdf", file.file_name)
    };
    Ok(ResumeFile {
        file_name,
        bytes: file.bytes,
    })
}

/// Turns a submitted form into a flow request. Rejections are also shown to
/// the user as a warning toast.
pub fn prepare_request(
    form: UploadForm,
    session: &Session,
    notifications: &NotificationCenter,
    max_bytes: usize,
) -> Result<AnalyzeRequest, AppError> {
    let file = validate_pdf(form.file, max_bytes).map_err(|rejection| {
        let (title, message) = rejection.notice();
        notifications.warning(&session.username, title, &message);
        warn!("Upload from {} rejected: {rejection}", session.username);
        AppError::Validation(rejection.to_string())
    })?;

    analytics::resume_upload(&session.username, &file.file_name, file.bytes.len());
    Ok(AnalyzeRequest {
        company_name: form.company_name,
        job_title: form.job_title,
        job_description: form.job_description,
        file,
    })
}

/// Runs the flow once and reports the outcome as a toast.
pub async fn run_analysis(
    analyzer: &ResumeAnalyzer,
    request: AnalyzeRequest,
    session: &Session,
    notifications: &NotificationCenter,
    progress: &dyn ProgressSink,
) -> Result<AnalysisOutcome, AnalyzeError> {
    match analyzer.analyze(request, progress).await {
        Ok(outcome) => {
            notifications.success(
                &session.username,
                "Analysis Complete!",
                "Your resume has been analyzed successfully.",
            );
            analytics::resume_analysis_complete(&session.username, outcome.record.overall_score());
            info!("Analysis {} finished for {}", outcome.record.id, session.username);
            Ok(outcome)
        }
        Err(e) => {
            let (title, message) = e.notice();
            notifications.error(&session.username, title, message);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;
    use chrono::Utc;
    use std::time::Duration;

    fn upload(name: &str, content_type: Option<&str>, bytes: Bytes) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes,
        })
    }

    fn session() -> Session {
        Session {
            token: "t".to_string(),
            username: "ada".to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_accepts_pdf() {
        let file = validate_pdf(upload("cv.pdf", Some("application/pdf"), sample_pdf()), 1024).unwrap();
        assert_eq!(file.file_name, "cv.pdf");
    }

    #[test]
    fn test_accepts_pdf_by_content_type_alone() {
        let file = validate_pdf(upload("cv", Some("application/pdf"), sample_pdf()), 1024).unwrap();
        assert_eq!(file.file_name, "cv.pdf");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(validate_pdf(None, 1024).unwrap_err(), UploadRejection::NoFile);
        assert!(matches!(
            validate_pdf(upload("cv.docx", None, sample_pdf()), 1024),
            Err(UploadRejection::NotPdf(_))
        ));
        assert_eq!(
            validate_pdf(upload("cv.pdf", None, Bytes::new()), 1024).unwrap_err(),
            UploadRejection::Empty
        );
        assert!(matches!(
            validate_pdf(upload("cv.pdf", None, Bytes::from_static(b"PK\x03\x04zip")), 1024),
            Err(UploadRejection::NotPdf(_))
        ));
        assert!(matches!(
            validate_pdf(upload("cv.pdf", None, sample_pdf()), 8),
            Err(UploadRejection::TooLarge { max: 8, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_file_warns_user() {
        let center = NotificationCenter::new(Duration::from_millis(5000));
        let form = UploadForm {
            company_name: Some("Acme".to_string()),
            ..UploadForm::default()
        };

        let err = prepare_request(form, &session(), &center, 1024).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        let toasts = center.list("ada");
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "No File Selected");
    }

    #[test]
    fn test_blank_fields_become_none() {
        assert_eq!(non_blank("   ".to_string()), None);
        assert_eq!(non_blank(" Acme ".to_string()), Some("Acme".to_string()));
    }
}
