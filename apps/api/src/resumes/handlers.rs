use std::convert::Infallible;

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::flow::{ProgressSink, StatusTrail, UploadStatus};
use crate::auth::Session;
use crate::errors::AppError;
use crate::resumes::record::ResumeRecord;
use crate::resumes::upload::{prepare_request, read_upload_form, run_analysis};
use crate::state::AppState;
use crate::views::feedback::{
    ats_view, detail_sections, summary_view, AtsView, DetailSection, SummaryView,
};
use crate::views::stats::{compute_stats, resume_card, DashboardStats, ResumeCardView};

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeCardView>,
    pub stats: DashboardStats,
}

#[derive(Serialize)]
pub struct StatusView {
    pub status: UploadStatus,
    pub message: &'static str,
}

impl From<UploadStatus> for StatusView {
    fn from(status: UploadStatus) -> Self {
        Self {
            status,
            message: status.message(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeResponse {
    pub id: Uuid,
    pub redirect: String,
    pub overall_score: Option<u8>,
    pub statuses: Vec<StatusView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Complete,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetailResponse {
    pub id: Uuid,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub status: AnalysisStatus,
    pub pdf_url: String,
    pub image_url: String,
    pub summary: Option<SummaryView>,
    pub ats: Option<AtsView>,
    pub details: Option<Vec<DetailSection>>,
}

impl From<&ResumeRecord> for ResumeDetailResponse {
    fn from(record: &ResumeRecord) -> Self {
        let feedback = record.feedback.as_ref();
        Self {
            id: record.id,
            company_name: record.company_name.clone(),
            job_title: record.job_title.clone(),
            job_description: record.job_description.clone(),
            status: if record.is_pending() {
                AnalysisStatus::Pending
            } else {
                AnalysisStatus::Complete
            },
            pdf_url: format!("/api/v1/resumes/{}/pdf", record.id),
            image_url: format!("/api/v1/resumes/{}/image", record.id),
            summary: feedback.map(summary_view),
            ats: feedback.map(ats_view),
            details: feedback.map(detail_sections),
        }
    }
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let records = state.records_for(&session).list().await?;
    Ok(Json(ResumeListResponse {
        resumes: records.iter().map(resume_card).collect(),
        stats: compute_stats(&records),
    }))
}

/// POST /api/v1/resumes
/// Runs the whole analysis before answering.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Json<CreateResumeResponse>, AppError> {
    let form = read_upload_form(&mut multipart).await?;
    let request = prepare_request(
        form,
        &session,
        &state.notifications,
        state.config.max_upload_bytes,
    )?;

    let trail = StatusTrail::default();
    let outcome = run_analysis(
        &state.analyzer_for(&session),
        request,
        &session,
        &state.notifications,
        &trail,
    )
    .await?;

    Ok(Json(CreateResumeResponse {
        id: outcome.record.id,
        redirect: outcome.redirect,
        overall_score: outcome.record.overall_score(),
        statuses: trail.into_inner().into_iter().map(StatusView::from).collect(),
    }))
}

/// Forwards step boundaries to an SSE stream.
struct SseProgress(mpsc::UnboundedSender<Event>);

impl ProgressSink for SseProgress {
    fn report(&self, status: UploadStatus) {
        let data = serde_json::to_string(&StatusView::from(status)).unwrap_or_default();
        // The client may have disconnected; the flow still finishes.
        let _ = self.0.send(Event::default().event("status").data(data));
    }
}

/// POST /api/v1/resumes/stream
/// Same flow as create, reported live: `status` events, then `complete` or `error`.
pub async fn handle_stream_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let form = read_upload_form(&mut multipart).await?;
    let request = prepare_request(
        form,
        &session,
        &state.notifications,
        state.config.max_upload_bytes,
    )?;

    let (tx, rx) = mpsc::unbounded_channel();
    let analyzer = state.analyzer_for(&session);
    let notifications = state.notifications.clone();
    tokio::spawn(async move {
        let sink = SseProgress(tx);
        let result = run_analysis(&analyzer, request, &session, &notifications, &sink).await;
        let event = match result {
            Ok(outcome) => Event::default().event("complete").data(
                json!({
                    "id": outcome.record.id,
                    "redirect": outcome.redirect,
                    "overallScore": outcome.record.overall_score(),
                })
                .to_string(),
            ),
            Err(e) => {
                let (title, message) = e.notice();
                warn!("Streamed analysis failed: {e}");
                Event::default().event("error").data(
                    json!({ "code": e.code(), "title": title, "message": message }).to_string(),
                )
            }
        };
        let _ = sink.0.send(event);
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn load_record(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<ResumeRecord, AppError> {
    state
        .records_for(session)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let record = load_record(&state, &session, id).await?;
    Ok(Json(ResumeDetailResponse::from(&record)))
}

/// DELETE /api/v1/resumes/:id
/// Removes the record, then both of its blobs. A blob that cannot be removed
/// is left orphaned and logged; the record never outlives its files.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let record = load_record(&state, &session, id).await?;
    state.records_for(&session).delete(id).await?;

    let files = state.files_for(&session);
    for path in [&record.resume_path, &record.image_path] {
        match files.delete(path).await {
            Ok(true) => {}
            Ok(false) => warn!("Blob {path} of resume {id} was already gone"),
            Err(e) => warn!("Blob {path} of resume {id} left orphaned: {e}"),
        }
    }
    state.notifications.info(
        &session.username,
        "Resume Deleted",
        "The resume and its preview were removed.",
    );
    info!("Resume {id} deleted by {}", session.username);
    Ok(StatusCode::NO_CONTENT)
}

async fn blob_response(
    state: &AppState,
    session: &Session,
    path: &str,
    content_type: &'static str,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state
        .files_for(session)
        .get(path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blob {path} not found")))?;
    Ok(([(CONTENT_TYPE, content_type)], bytes))
}

/// GET /api/v1/resumes/:id/pdf
pub async fn handle_resume_pdf(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = load_record(&state, &session, id).await?;
    blob_response(&state, &session, &record.resume_path, "application/pdf").await
}

/// GET /api/v1/resumes/:id/image
pub async fn handle_resume_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = load_record(&state, &session, id).await?;
    blob_response(&state, &session, &record.image_path, "image/png").await
}
