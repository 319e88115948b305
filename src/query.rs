//! Question handling: input validation, readiness gate, and backend dispatch.

use crate::backend::SearchBackend;
use crate::config::BackendKind;
use crate::notice::Notice;
use crate::readiness::check_readiness;
use crate::session::SessionState;
use time::{Duration, OffsetDateTime};

/// Guidance shown after a failed question, naming the active kind of resource.
pub fn retry_hint(kind: BackendKind) -> String {
    format!(
        "Try deleting the {} and starting over, or wait longer for file processing.",
        kind.label().to_lowercase()
    )
}

/// Result of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Question was blank; nothing was sent.
    EmptyQuestion,
    /// Uploads are not queryable yet; nothing was sent.
    NotReady(String),
    /// Text returned by the backend.
    Answer(String),
    /// Backend call failed.
    Failed {
        /// Error description.
        error: String,
        /// Suggested recovery.
        hint: String,
    },
}

impl QueryOutcome {
    /// Banners describing the outcome. Answers get a success banner; their text is rendered apart.
    pub fn notices(&self) -> Vec<Notice> {
        match self {
            Self::EmptyQuestion => vec![Notice::warning("Please enter a question.")],
            Self::NotReady(message) => vec![Notice::warning(message.clone())],
            Self::Answer(_) => vec![Notice::success("Answer:")],
            Self::Failed { error, hint } => {
                vec![Notice::error(format!("Error: {error}")), Notice::info(hint.clone())]
            }
        }
    }
}

/// Validate and dispatch a question.
///
/// Blank input and a closed readiness gate are rejected before any remote call. Once the gate is
/// open the backend may veto through [`SearchBackend::confirm_ready`]; otherwise exactly one
/// [`SearchBackend::ask`] call is made.
pub async fn ask_question(
    backend: &dyn SearchBackend,
    session: &SessionState,
    question: &str,
    now: OffsetDateTime,
    delay: Duration,
) -> QueryOutcome {
    let question = question.trim();
    if question.is_empty() {
        return QueryOutcome::EmptyQuestion;
    }

    let readiness = check_readiness(session.upload_time, now, delay);
    if !readiness.ready {
        tracing::debug!(message = %readiness.message, "Question held by readiness gate");
        return QueryOutcome::NotReady(readiness.message);
    }

    match backend.confirm_ready().await {
        Ok(true) => {}
        Ok(false) => {
            let label = backend.kind().label();
            return QueryOutcome::NotReady(format!(
                "{label} '{}' does not exist yet. Create it and upload files first.",
                backend.resource_name()
            ));
        }
        Err(error) => {
            tracing::error!(error = %error, "Readiness check failed");
            return QueryOutcome::Failed {
                error: format!("Error checking file status: {error}"),
                hint: retry_hint(backend.kind()),
            };
        }
    }

    match backend.ask(question).await {
        Ok(answer) => {
            tracing::info!(
                resource = backend.resource_name(),
                chars = answer.len(),
                "Question answered"
            );
            QueryOutcome::Answer(answer)
        }
        Err(error) => {
            tracing::error!(resource = backend.resource_name(), error = %error, "Question failed");
            QueryOutcome::Failed {
                error: error.to_string(),
                hint: retry_hint(backend.kind()),
            }
        }
    }
}
