//! HTTP surface for PDF Desk.
//!
//! The router serves a single HTML form plus a JSON status probe:
//!
//! - `GET /` – Render the three-tab form for the caller's session.
//! - `POST /resource` – Create the configured assistant or index.
//! - `POST /upload` – Accept a ZIP archive (multipart field `archive`) and ingest its PDFs.
//! - `POST /ask` – Ask a question (form field `question`) once the readiness gate opens.
//! - `POST /delete` – Delete the configured resource and forget the session's uploads.
//! - `GET /status` – Report backend, readiness, upload time and counters as JSON.
//!
//! Every form action stores its outcome in the session and re-renders the page, so a reload shows
//! the same messages.

use crate::backend::SearchBackend;
use crate::ingestion::{IngestReport, ingest_archive};
use crate::metrics::{DeskMetrics, MetricsSnapshot};
use crate::notice::Notice;
use crate::page::{PageView, Tab, render_page};
use crate::query::{QueryOutcome, ask_question};
use crate::readiness::{Readiness, check_readiness};
use crate::resources::{create_resource, delete_resource};
use crate::session::{SessionState, SessionStore};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Multipart field carrying the uploaded archive.
pub const ARCHIVE_FIELD: &str = "archive";

/// Largest request body accepted by `POST /upload`.
pub const MAX_ARCHIVE_BYTES: usize = 256 * 1024 * 1024;

/// Warning shown when the upload form arrives without a usable archive.
pub const NO_ARCHIVE_MESSAGE: &str = "Please choose a ZIP file to upload.";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Backend performing remote operations.
    pub backend: Arc<dyn SearchBackend>,
    /// Per-browser sessions.
    pub sessions: Arc<SessionStore>,
    /// Activity counters.
    pub metrics: Arc<DeskMetrics>,
    /// Wait between an upload and the first accepted question.
    pub ready_delay: Duration,
}

impl AppState {
    /// Fresh state with no sessions and zeroed counters.
    pub fn new(backend: Arc<dyn SearchBackend>, ready_delay: Duration) -> Self {
        Self {
            backend,
            sessions: Arc::new(SessionStore::new()),
            metrics: Arc::new(DeskMetrics::new()),
            ready_delay,
        }
    }
}

/// Build the HTTP router serving the form.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_page))
        .route("/resource", post(create_action))
        .route(
            "/upload",
            post(upload_action).layer(DefaultBodyLimit::max(MAX_ARCHIVE_BYTES)),
        )
        .route("/ask", post(ask_action))
        .route("/delete", post(delete_action))
        .route("/status", get(get_status))
        .with_state(state)
}

async fn show_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let guard = session.state.lock().await;
    render(&state, &guard, Tab::Upload, session.set_cookie)
}

async fn create_action(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let mut guard = session.state.lock().await;
    guard.create_status = Some(create_resource(state.backend.as_ref()).await);
    render(&state, &guard, Tab::Upload, session.set_cookie)
}

/// Ingest the uploaded archive.
///
/// A missing, empty, or non-ZIP upload is answered with a warning before any remote call.
async fn upload_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let session = state.sessions.resolve(&headers).await;
    let archive = read_archive_field(&mut multipart).await?;

    let mut guard = session.state.lock().await;
    guard.upload_status.clear();
    guard.upload_lines.clear();

    match archive {
        None => {
            tracing::info!(session = %session.id, "Upload rejected: no archive supplied");
            guard.upload_status.push(Notice::warning(NO_ARCHIVE_MESSAGE));
        }
        Some(bytes) => {
            let outcome = ingest_archive(
                state.backend.as_ref(),
                &mut guard,
                bytes,
                OffsetDateTime::now_utc(),
            )
            .await;
            match outcome {
                Ok(report) => {
                    state.metrics.record_ingest(&report);
                    guard
                        .upload_status
                        .push(upload_summary(&report, state.ready_delay));
                    guard.upload_lines = report.status_lines;
                }
                Err(error) => {
                    tracing::error!(session = %session.id, error = %error, "Upload failed");
                    guard
                        .upload_status
                        .push(Notice::error(format!("[!] Upload failed: {error}")));
                }
            }
        }
    }

    Ok(render(&state, &guard, Tab::Upload, session.set_cookie))
}

async fn read_archive_field(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(ARCHIVE_FIELD) {
            continue;
        }
        let is_zip = field.file_name().is_some_and(has_zip_suffix);
        let bytes = field.bytes().await?;
        if bytes.is_empty() || !is_zip {
            return Ok(None);
        }
        return Ok(Some(bytes.to_vec()));
    }
    Ok(None)
}

fn has_zip_suffix(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".zip")
}

fn upload_summary(report: &IngestReport, ready_delay: Duration) -> Notice {
    let wait = ready_delay.whole_seconds();
    if report.attempted == 0 {
        Notice::warning("No PDF files found in the archive.")
    } else if report.failed == 0 {
        Notice::success(format!(
            "All files uploaded successfully! Please wait ~{wait} seconds before querying."
        ))
    } else {
        Notice::warning(format!(
            "{} of {} files uploaded. Please wait ~{wait} seconds before querying.",
            report.uploaded, report.attempted
        ))
    }
}

/// Form body for `POST /ask`.
#[derive(Deserialize)]
struct AskForm {
    #[serde(default)]
    question: String,
}

async fn ask_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let mut guard = session.state.lock().await;

    let outcome = ask_question(
        state.backend.as_ref(),
        &guard,
        &form.question,
        OffsetDateTime::now_utc(),
        state.ready_delay,
    )
    .await;
    state.metrics.record_query(&outcome);

    guard.ask_outcome = outcome.notices();
    guard.answer = match outcome {
        QueryOutcome::Answer(answer) => Some(answer),
        _ => None,
    };
    guard.last_question = form.question;

    render(&state, &guard, Tab::Ask, session.set_cookie)
}

async fn delete_action(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let mut guard = session.state.lock().await;
    let notice = delete_resource(state.backend.as_ref(), &mut guard).await;
    guard.delete_status = Some(notice);
    render(&state, &guard, Tab::Delete, session.set_cookie)
}

/// Response body for `GET /status`.
#[derive(Serialize)]
struct StatusResponse {
    backend: &'static str,
    resource_name: String,
    readiness: Readiness,
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_time: Option<String>,
    file_ids: usize,
    metrics: MetricsSnapshot,
}

async fn get_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let guard = session.state.lock().await;
    let readiness = check_readiness(guard.upload_time, OffsetDateTime::now_utc(), state.ready_delay);

    let body = StatusResponse {
        backend: state.backend.kind().label(),
        resource_name: state.backend.resource_name().to_string(),
        readiness,
        upload_time: guard
            .upload_time
            .and_then(|uploaded_at| uploaded_at.format(&Rfc3339).ok()),
        file_ids: guard.file_ids.len(),
        metrics: state.metrics.snapshot(),
    };
    with_cookie(Json(body).into_response(), session.set_cookie)
}

fn render(
    state: &AppState,
    session: &SessionState,
    active_tab: Tab,
    set_cookie: Option<HeaderValue>,
) -> Response {
    let readiness = check_readiness(
        session.upload_time,
        OffsetDateTime::now_utc(),
        state.ready_delay,
    );
    let mut view = PageView::new(
        state.backend.kind(),
        state.backend.resource_name(),
        readiness,
    );
    view.active_tab = active_tab;
    view.upload_notices = session
        .create_status
        .iter()
        .chain(session.upload_status.iter())
        .cloned()
        .collect();
    view.upload_lines = session.upload_lines.clone();
    view.ask_notices = session.ask_outcome.clone();
    view.answer = session.answer.clone();
    view.question = session.last_question.clone();
    view.delete_notices = session.delete_status.iter().cloned().collect();

    with_cookie(Html(render_page(&view)).into_response(), set_cookie)
}

fn with_cookie(mut response: Response, set_cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

struct AppError(MultipartError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Rejected malformed upload");
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read upload: {}", self.0),
        )
            .into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self(inner)
    }
}
