//! Upload orchestration: the "analyze a résumé" use case.
//!
//! Flow: upload PDF → render preview → upload preview → write pending record
//!       → AI feedback → parse → overwrite record → hand back the route.
//!
//! Every step runs once, in order, and the first failure ends the run. The
//! pending record written in step 4 is left behind if analysis fails later.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::client::FeedbackClient;
use crate::analysis::feedback::parse_feedback;
use crate::analysis::prompts::prepare_instructions;
use crate::analysis::rasterize::{preview_file_name, PdfRasterizer};
use crate::resumes::record::{detail_route, ResumeRecord};
use crate::resumes::repository::ResumeRepository;
use crate::storage::{sanitize_file_name, BlobStore};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("resume upload failed: {0}")]
    Upload(String),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("preview image upload failed: {0}")]
    PreviewUpload(String),

    #[error("record could not be saved: {0}")]
    Persist(String),

    #[error("analysis failed: {0}")]
    Analysis(String),
}

impl AnalyzeError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::Upload(_) | AnalyzeError::PreviewUpload(_) => "UPLOAD_ERROR",
            AnalyzeError::Conversion(_) => "CONVERSION_ERROR",
            AnalyzeError::Persist(_) => "PERSIST_ERROR",
            AnalyzeError::Analysis(_) => "ANALYSIS_ERROR",
        }
    }

    /// Title and message shown to the user.
    pub fn notice(&self) -> (&'static str, &'static str) {
        match self {
            AnalyzeError::Upload(_) => (
                "Upload Failed",
                "Failed to upload your resume. Please try again.",
            ),
            AnalyzeError::Conversion(_) => (
                "Conversion Failed",
                "Failed to convert PDF to image. Please ensure your PDF is valid.",
            ),
            AnalyzeError::PreviewUpload(_) => (
                "Upload Failed",
                "Failed to upload the resume preview. Please try again.",
            ),
            AnalyzeError::Persist(_) | AnalyzeError::Analysis(_) => (
                "Analysis Failed",
                "Something went wrong during the analysis. Please try again.",
            ),
        }
    }
}

/// Step boundaries reported while the flow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    UploadingFile,
    Converting,
    UploadingImage,
    Preparing,
    Analyzing,
    Complete,
}

impl UploadStatus {
    pub fn message(&self) -> &'static str {
        match self {
            UploadStatus::UploadingFile => "Uploading the file...",
            UploadStatus::Converting => "Converting to image...",
            UploadStatus::UploadingImage => "Uploading the image...",
            UploadStatus::Preparing => "Preparing data...",
            UploadStatus::Analyzing => "Analyzing...",
            UploadStatus::Complete => "Analysis complete, redirecting...",
        }
    }
}

/// Receives status updates. Reporting never fails the flow.
pub trait ProgressSink: Send + Sync {
    fn report(&self, status: UploadStatus);
}

/// Collects every status in order.
#[derive(Default)]
pub struct StatusTrail(Mutex<Vec<UploadStatus>>);

impl StatusTrail {
    pub fn into_inner(self) -> Vec<UploadStatus> {
        self.0.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for StatusTrail {
    fn report(&self, status: UploadStatus) {
        if let Ok(mut trail) = self.0.lock() {
            trail.push(status);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub file: ResumeFile,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: ResumeRecord,
    /// Where the client should navigate next.
    pub redirect: String,
}

/// Runs the analysis use case against injected adapters.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    files: Arc<dyn BlobStore>,
    records: ResumeRepository,
    rasterizer: Arc<dyn PdfRasterizer>,
    feedback: Arc<dyn FeedbackClient>,
}

impl ResumeAnalyzer {
    pub fn new(
        files: Arc<dyn BlobStore>,
        records: ResumeRepository,
        rasterizer: Arc<dyn PdfRasterizer>,
        feedback: Arc<dyn FeedbackClient>,
    ) -> Self {
        Self {
            files,
            records,
            rasterizer,
            feedback,
        }
    }

    pub async fn analyze(
        &self,
        request: AnalyzeRequest,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        let AnalyzeRequest {
            company_name,
            job_title,
            job_description,
            file,
        } = request;
        let file_name = sanitize_file_name(&file.file_name);
        // Blobs of one run share a folder.
        let folder = Uuid::new_v4();

        // 1. Original PDF
        progress.report(UploadStatus::UploadingFile);
        let resume_blob = self
            .files
            .put(
                &format!("{folder}/{file_name}"),
                file.bytes.clone(),
                "application/pdf",
            )
            .await
            .map_err(|e| AnalyzeError::Upload(e.to_string()))?;

        // 2. First-page preview
        progress.report(UploadStatus::Converting);
        let preview = self
            .rasterizer
            .render_first_page(file.bytes)
            .await
            .map_err(|e| AnalyzeError::Conversion(e.to_string()))?
            .ok_or_else(|| AnalyzeError::Conversion("no image produced".to_string()))?;
        debug!("Preview rendered at {}x{}", preview.width, preview.height);

        // 3. Preview upload; failing here aborts like any other upload.
        progress.report(UploadStatus::UploadingImage);
        let image_blob = self
            .files
            .put(
                &format!("{folder}/{}", preview_file_name(&file_name)),
                preview.png,
                "image/png",
            )
            .await
            .map_err(|e| AnalyzeError::PreviewUpload(e.to_string()))?;

        // 4. Pending record, so a partial result survives a failed analysis.
        progress.report(UploadStatus::Preparing);
        let mut record = ResumeRecord {
            id: Uuid::new_v4(),
            resume_path: resume_blob.path,
            image_path: image_blob.path,
            company_name,
            job_title,
            job_description,
            feedback: None,
        };
        self.records
            .save(&record)
            .await
            .map_err(|e| AnalyzeError::Persist(e.to_string()))?;
        info!("Pending record {} written", record.id);

        // 5. AI feedback. Slow; no cancellation past this point.
        progress.report(UploadStatus::Analyzing);
        let instructions =
            prepare_instructions(record.job_title.as_deref(), record.job_description.as_deref());
        let response = self
            .feedback
            .feedback(&record.resume_path, &instructions)
            .await
            .map_err(|e| AnalyzeError::Analysis(e.to_string()))?
            .ok_or_else(|| AnalyzeError::Analysis("no feedback returned".to_string()))?;

        // 6. Text → Feedback
        let text = response
            .text()
            .ok_or_else(|| AnalyzeError::Analysis("feedback has no text".to_string()))?;
        let feedback = parse_feedback(text).map_err(|e| {
            warn!("Unparseable feedback for record {}: {e}", record.id);
            AnalyzeError::Analysis(e.to_string())
        })?;

        // 7. Final record
        record.feedback = Some(feedback);
        self.records
            .save(&record)
            .await
            .map_err(|e| AnalyzeError::Persist(e.to_string()))?;

        // 8. Done
        progress.report(UploadStatus::Complete);
        info!(
            "Record {} analysed (overall score {})",
            record.id,
            record.overall_score().unwrap_or_default()
        );
        let redirect = detail_route(record.id);
        Ok(AnalysisOutcome { record, redirect })
    }
}
