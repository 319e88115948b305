//! Create and delete the remote resource, reporting every outcome as a status message.

use crate::backend::{BackendError, SearchBackend};
use crate::notice::Notice;
use crate::session::SessionState;

/// Create the configured resource. An existing resource is reported, not treated as a failure.
pub async fn create_resource(backend: &dyn SearchBackend) -> Notice {
    let label = backend.kind().label();
    let name = backend.resource_name();

    match backend.create_resource().await {
        Ok(()) => {
            tracing::info!(kind = label, resource = name, "Resource created");
            Notice::success(format!("[✓] {label} '{name}' created."))
        }
        Err(BackendError::AlreadyExists(_)) => {
            tracing::info!(kind = label, resource = name, "Resource already exists");
            Notice::warning(format!("[!] {label} '{name}' already exists."))
        }
        Err(error) => {
            tracing::error!(kind = label, resource = name, error = %error, "Resource creation failed");
            Notice::error(format!(
                "[!] Failed to create {} '{name}': {error}",
                label.to_lowercase()
            ))
        }
    }
}

/// Delete the configured resource and forget the session's uploads.
///
/// The session is cleared when the resource is gone afterwards, whether this call removed it or
/// it was already absent.
pub async fn delete_resource(backend: &dyn SearchBackend, session: &mut SessionState) -> Notice {
    let label = backend.kind().label();
    let name = backend.resource_name();

    match backend.delete_resource().await {
        Ok(()) => {
            session.clear_uploads();
            tracing::info!(kind = label, resource = name, "Resource deleted");
            Notice::warning(format!("[✓] {label} '{name}' deleted successfully."))
        }
        Err(BackendError::NotFound(_)) => {
            session.clear_uploads();
            tracing::info!(kind = label, resource = name, "Resource already absent");
            Notice::warning(format!("[!] {label} '{name}' does not exist."))
        }
        Err(error) => {
            tracing::error!(kind = label, resource = name, error = %error, "Resource deletion failed");
            Notice::error(format!(
                "[!] Failed to delete {} '{name}': {error}",
                label.to_lowercase()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::testing::StubBackend;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn second_create_reports_existing_resource() {
        let backend = StubBackend::new();
        let first = create_resource(&backend).await;
        let second = create_resource(&backend).await;

        assert_eq!(first.level, NoticeLevel::Success);
        assert_eq!(first.text, "[✓] Assistant 'stub-assistant' created.");
        assert_eq!(second.level, NoticeLevel::Warning);
        assert_eq!(second.text, "[!] Assistant 'stub-assistant' already exists.");
    }

    #[tokio::test]
    async fn deleting_missing_resource_is_a_status_not_an_error() {
        let backend = StubBackend::new();
        let mut session = SessionState::default();
        session.record_upload(OffsetDateTime::UNIX_EPOCH, vec!["f".into()]);

        let notice = delete_resource(&backend, &mut session).await;
        assert_eq!(notice.text, "[!] Assistant 'stub-assistant' does not exist.");
        assert!(session.upload_time.is_none());
    }

    #[tokio::test]
    async fn delete_after_create_clears_session() {
        let backend = StubBackend::new();
        create_resource(&backend).await;
        let mut session = SessionState::default();
        session.record_upload(OffsetDateTime::UNIX_EPOCH, vec!["f".into()]);

        let notice = delete_resource(&backend, &mut session).await;
        assert_eq!(
            notice.text,
            "[✓] Assistant 'stub-assistant' deleted successfully."
        );
        assert!(session.file_ids.is_empty());
    }

    #[tokio::test]
    async fn remote_faults_become_error_notices() {
        let backend = StubBackend::new().failing_remote("quota exceeded");
        let notice = create_resource(&backend).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.starts_with("[!] Failed to create assistant 'stub-assistant':"));
        assert!(notice.text.contains("quota exceeded"));

        let mut session = SessionState::default();
        session.record_upload(OffsetDateTime::UNIX_EPOCH, Vec::new());
        let notice = delete_resource(&backend, &mut session).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(session.upload_time.is_some());
    }
}
