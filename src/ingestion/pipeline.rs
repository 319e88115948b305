//! Archive ingestion: extract, filter, and forward each document to the backend.

use crate::backend::SearchBackend;
use crate::ingestion::archive::extract_documents;
use crate::ingestion::types::{IngestError, IngestReport};
use crate::session::SessionState;
use time::OffsetDateTime;

/// Ingest every PDF in `archive` and record the upload in the session.
///
/// Archive-level failures abort before any document is forwarded and leave the session as it
/// was. Per-document failures become status lines and never stop the remaining documents.
pub async fn ingest_archive(
    backend: &dyn SearchBackend,
    session: &mut SessionState,
    archive: Vec<u8>,
    now: OffsetDateTime,
) -> Result<IngestReport, IngestError> {
    let archive_bytes = archive.len();
    let extracted = tokio::task::spawn_blocking(move || extract_documents(&archive)).await??;
    tracing::info!(
        resource = backend.resource_name(),
        archive_bytes,
        total_files = extracted.total_files,
        documents = extracted.documents.len(),
        "Ingesting archive"
    );

    let mut report = IngestReport::default();
    for document in &extracted.documents {
        report.attempted += 1;
        match backend.ingest(document).await {
            Ok(receipt) => {
                report.uploaded += 1;
                if let Some(id) = receipt.file_id {
                    report.file_ids.push(id);
                }
                report
                    .status_lines
                    .push(format!("[✓] Uploaded: {}", document.name));
            }
            Err(error) => {
                report.failed += 1;
                tracing::warn!(document = %document.name, error = %error, "Document upload failed");
                report
                    .status_lines
                    .push(format!("[!] Failed to upload {}: {error}", document.name));
            }
        }
    }

    session.record_upload(now, report.file_ids.clone());
    tracing::info!(
        attempted = report.attempted,
        uploaded = report.uploaded,
        failed = report.failed,
        "Archive ingested"
    );
    Ok(report)
}
