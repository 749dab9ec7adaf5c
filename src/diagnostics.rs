//! Observability collaborator injected into an [`EventStream`](crate::EventStream).
//!
//! The bus never logs through a process-global facility on its control path.
//! Every internal degradation (dropped event, failed sink write, elapsed
//! broadcast deadline) is reported to a [`Diagnostics`] implementation chosen
//! at stream construction, so embedding applications decide how the bus is
//! observed. [`TracingDiagnostics`] is the default and forwards to `tracing`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Receiver for internal bus degradations.
///
/// Every method has an empty default body; implementations override what
/// they care about. Calls happen on the emitting caller's thread or on the
/// broadcast worker task and must not block.
pub trait Diagnostics: Send + Sync {
    /// An event could not be serialized and was dropped before broadcast.
    fn serialization_failed(&self, _source: &str, _error: &serde_json::Error) {}

    /// A write to one sink failed for one line (receiver gone). The sink
    /// keeps its slot until an explicit detach.
    fn sink_write_failed(&self, _sink: Uuid) {}

    /// The per-line broadcast deadline elapsed; pending writes for that line
    /// were abandoned.
    fn broadcast_deadline_exceeded(&self, _listeners: usize) {}

    /// A wait scan hit an undecodable record and stopped decoding.
    fn decode_failed(&self, _error: &serde_json::Error) {}

    fn worker_started(&self) {}

    fn worker_stopped(&self) {}
}

/// Default collaborator: forwards degradations to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn serialization_failed(&self, source: &str, error: &serde_json::Error) {
        tracing::warn!(source, error = %error, "event dropped: serialization failed");
    }

    fn sink_write_failed(&self, sink: Uuid) {
        tracing::debug!(sink = %sink, "sink write failed for one line");
    }

    fn broadcast_deadline_exceeded(&self, listeners: usize) {
        tracing::warn!(listeners, "broadcast deadline elapsed; abandoning remaining writes");
    }

    fn decode_failed(&self, error: &serde_json::Error) {
        tracing::debug!(error = %error, "wait scan stopped on undecodable record");
    }

    fn worker_started(&self) {
        tracing::debug!("broadcast worker started");
    }

    fn worker_stopped(&self) {
        tracing::debug!("broadcast worker stopped");
    }
}

/// What a recorded diagnostic was about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticDetail {
    SerializationFailed { source: String, error: String },
    SinkWriteFailed { sink: Uuid },
    BroadcastDeadlineExceeded { listeners: usize },
    DecodeFailed { error: String },
    WorkerStarted,
    WorkerStopped,
}

/// One recorded diagnostic with its observation time.
#[derive(Clone, Debug)]
pub struct StreamDiagnostic {
    pub when: DateTime<Utc>,
    pub detail: DiagnosticDetail,
}

/// In-memory collaborator for tests and snapshots.
#[derive(Clone, Default)]
pub struct MemoryDiagnostics {
    entries: Arc<Mutex<Vec<StreamDiagnostic>>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn snapshot(&self) -> Vec<StreamDiagnostic> {
        self.entries.lock().clone()
    }

    /// True if any recorded entry matches the predicate.
    pub fn any(&self, predicate: impl Fn(&DiagnosticDetail) -> bool) -> bool {
        self.entries.lock().iter().any(|d| predicate(&d.detail))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn record(&self, detail: DiagnosticDetail) {
        self.entries.lock().push(StreamDiagnostic {
            when: Utc::now(),
            detail,
        });
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn serialization_failed(&self, source: &str, error: &serde_json::Error) {
        self.record(DiagnosticDetail::SerializationFailed {
            source: source.to_string(),
            error: error.to_string(),
        });
    }

    fn sink_write_failed(&self, sink: Uuid) {
        self.record(DiagnosticDetail::SinkWriteFailed { sink });
    }

    fn broadcast_deadline_exceeded(&self, listeners: usize) {
        self.record(DiagnosticDetail::BroadcastDeadlineExceeded { listeners });
    }

    fn decode_failed(&self, error: &serde_json::Error) {
        self.record(DiagnosticDetail::DecodeFailed {
            error: error.to_string(),
        });
    }

    fn worker_started(&self) {
        self.record(DiagnosticDetail::WorkerStarted);
    }

    fn worker_stopped(&self) {
        self.record(DiagnosticDetail::WorkerStopped);
    }
}
