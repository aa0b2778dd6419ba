//! Audit-event recording.
//!
//! Every authentication decision and administrative mutation goes through
//! here. Records are append-only from this crate's point of view; retention
//! and purging belong to whoever owns the sink.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::AuditLog;

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: AuditLog) -> Result<(), anyhow::Error>;
}

/// Writes audit records to a sink without ever failing the operation that
/// produced them.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Append a record and wait for the write. Used on failure paths, where
    /// the record must exist before the rejection is returned. A sink error
    /// is logged but never masks the rejection itself.
    pub async fn record(&self, record: AuditLog) {
        if let Err(e) = self.sink.append(record.clone()).await {
            tracing::error!(
                error = %e,
                action = record.action.as_str(),
                "Failed to write audit record"
            );
        }
    }

    /// Append a record in the background. Used on success paths, where the
    /// caller should not wait on the trail.
    pub fn record_async(&self, record: AuditLog) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.append(record.clone()).await {
                tracing::error!(
                    error = %e,
                    action = record.action.as_str(),
                    "Failed to write audit record"
                );
            }
        });
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditLog>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<AuditLog> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: AuditLog) -> Result<(), anyhow::Error> {
        self.records
            .lock()
            .map_err(|e| anyhow::anyhow!("Memory audit sink mutex poisoned: {}", e))?
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditAction, AuditOutcome};

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _record: AuditLog) -> Result<(), anyhow::Error> {
            Err(anyhow::anyhow!("sink unavailable"))
        }
    }

    #[tokio::test]
    async fn record_appends_to_the_sink() {
        let sink = Arc::new(MemoryAuditSink::new());
        let recorder = AuditRecorder::new(sink.clone());

        recorder
            .record(AuditLog::failure(AuditAction::LoginFailed, "nope"))
            .await;

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, AuditOutcome::Failed);
    }

    #[tokio::test]
    async fn sink_failure_does_not_propagate() {
        let recorder = AuditRecorder::new(Arc::new(FailingSink));
        // Must return normally despite the failing sink.
        recorder
            .record(AuditLog::success(AuditAction::Logout))
            .await;
    }
}
