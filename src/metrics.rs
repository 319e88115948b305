use crate::ingestion::IngestReport;
use crate::query::QueryOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing form activity since startup.
#[derive(Default)]
pub struct DeskMetrics {
    archives_processed: AtomicU64,
    files_uploaded: AtomicU64,
    files_failed: AtomicU64,
    questions_answered: AtomicU64,
    questions_rejected: AtomicU64,
    questions_failed: AtomicU64,
}

impl DeskMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed archive ingestion.
    pub fn record_ingest(&self, report: &IngestReport) {
        self.archives_processed.fetch_add(1, Ordering::Relaxed);
        self.files_uploaded
            .fetch_add(report.uploaded as u64, Ordering::Relaxed);
        self.files_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    /// Record how a question was handled.
    pub fn record_query(&self, outcome: &QueryOutcome) {
        let counter = match outcome {
            QueryOutcome::Answer(_) => &self.questions_answered,
            QueryOutcome::EmptyQuestion | QueryOutcome::NotReady(_) => &self.questions_rejected,
            QueryOutcome::Failed { .. } => &self.questions_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            archives_processed: self.archives_processed.load(Ordering::Relaxed),
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            questions_rejected: self.questions_rejected.load(Ordering::Relaxed),
            questions_failed: self.questions_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of form counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Archives ingested since startup.
    pub archives_processed: u64,
    /// Documents accepted by the backend.
    pub files_uploaded: u64,
    /// Documents the backend rejected.
    pub files_failed: u64,
    /// Questions that produced an answer.
    pub questions_answered: u64,
    /// Questions turned away before reaching the backend.
    pub questions_rejected: u64,
    /// Questions whose backend call failed.
    pub questions_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_ingests_and_queries() {
        let metrics = DeskMetrics::new();
        metrics.record_ingest(&IngestReport {
            attempted: 3,
            uploaded: 2,
            failed: 1,
            ..Default::default()
        });
        metrics.record_query(&QueryOutcome::Answer("ok".into()));
        metrics.record_query(&QueryOutcome::EmptyQuestion);
        metrics.record_query(&QueryOutcome::NotReady("wait".into()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.archives_processed, 1);
        assert_eq!(snapshot.files_uploaded, 2);
        assert_eq!(snapshot.files_failed, 1);
        assert_eq!(snapshot.questions_answered, 1);
        assert_eq!(snapshot.questions_rejected, 2);
        assert_eq!(snapshot.questions_failed, 0);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let snapshot = DeskMetrics::new().snapshot();
        assert_eq!(snapshot.archives_processed, 0);
        assert_eq!(snapshot.questions_answered, 0);
    }
}
