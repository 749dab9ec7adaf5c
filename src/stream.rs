//! The producer-facing stream: emit operations and worker lifecycle.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use sysinfo::System;
use tokio::sync::mpsc;

use crate::broadcast::{self, WorkerSlot, WriterContext};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::event::{Event, EventKind};
use crate::handle::StreamHandle;
use crate::sink::{Line, ListenerSet, Sink};

/// Node identity used when hostname resolution fails.
pub const NODE_FALLBACK: &str = "<unknown>";

const DEFAULT_SINK_CAPACITY: usize = 64;

pub(crate) struct Shared {
    pub(crate) source: String,
    pub(crate) node: String,
    pub(crate) line_tx: flume::Sender<Line>,
    // Kept so a fresh worker can be bound to the same channel after the
    // previous one drained out.
    pub(crate) line_rx: flume::Receiver<Line>,
    pub(crate) listeners: ListenerSet,
    pub(crate) worker: Arc<Mutex<WorkerSlot>>,
    pub(crate) sink_capacity: usize,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
}

/// A single producer's event source plus its attached consumers.
///
/// Cloning is cheap and clones share the same listener set and broadcast
/// worker, so a stream can be handed to any number of producing tasks.
///
/// Emitting never fails observably: serialization problems drop the event
/// and are reported through the stream's [`Diagnostics`]; emitting with no
/// attached consumers is a no-op rather than a backlog.
///
/// ```
/// use std::time::Duration;
/// use hydrant::{EventKind, EventStream};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let stream = EventStream::new("billing");
/// let mut tap = stream.attach();
///
/// stream.info("ready");
///
/// let event = tap
///     .wait_for(EventKind::Info, "ready", Duration::from_secs(1))
///     .await
///     .expect("event in flight");
/// assert_eq!(event.source, "billing");
/// # }
/// ```
#[derive(Clone)]
pub struct EventStream {
    shared: Arc<Shared>,
}

impl EventStream {
    /// Create a stream with default settings. Hostname resolution is
    /// best-effort and falls back to [`NODE_FALLBACK`].
    pub fn new(source: impl Into<String>) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: impl Into<String>) -> EventStreamBuilder {
        EventStreamBuilder::new(source)
    }

    pub fn source(&self) -> &str {
        &self.shared.source
    }

    pub fn node(&self) -> &str {
        &self.shared.node
    }

    /// Number of currently attached consumers.
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(EventKind::Info, message, std::iter::empty::<Value>());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(EventKind::Warning, message, std::iter::empty::<Value>());
    }

    pub fn metric(&self, message: impl Into<String>) {
        self.emit(EventKind::Metric, message, std::iter::empty::<Value>());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EventKind::Error, message, std::iter::empty::<Value>());
    }

    pub fn info_with<P: Serialize>(
        &self,
        message: impl Into<String>,
        payload: impl IntoIterator<Item = P>,
    ) {
        self.emit(EventKind::Info, message, payload);
    }

    pub fn warn_with<P: Serialize>(
        &self,
        message: impl Into<String>,
        payload: impl IntoIterator<Item = P>,
    ) {
        self.emit(EventKind::Warning, message, payload);
    }

    pub fn metric_with<P: Serialize>(
        &self,
        message: impl Into<String>,
        payload: impl IntoIterator<Item = P>,
    ) {
        self.emit(EventKind::Metric, message, payload);
    }

    pub fn error_with<P: Serialize>(
        &self,
        message: impl Into<String>,
        payload: impl IntoIterator<Item = P>,
    ) {
        self.emit(EventKind::Error, message, payload);
    }

    /// Build, serialize and hand one event to the broadcast worker.
    ///
    /// Payload values are serialized individually; the first failure drops
    /// the whole event. Nothing is returned — callers cannot observe emit
    /// failing.
    pub fn emit<P: Serialize>(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        payload: impl IntoIterator<Item = P>,
    ) {
        // Broadcasting to zero sinks is a no-op, not a backlog.
        if self.shared.listeners.is_empty() {
            return;
        }

        let mut values = Vec::new();
        for value in payload {
            match serde_json::to_value(value) {
                Ok(value) => values.push(value),
                Err(err) => {
                    self.shared
                        .diagnostics
                        .serialization_failed(&self.shared.source, &err);
                    return;
                }
            }
        }

        let event = Event::new(
            kind,
            self.shared.source.clone(),
            self.shared.node.clone(),
            message,
            values,
        );
        let line = match event.to_line() {
            Ok(line) => line,
            Err(err) => {
                self.shared
                    .diagnostics
                    .serialization_failed(&self.shared.source, &err);
                return;
            }
        };
        let _ = self.shared.line_tx.send(Line::from(line));
    }

    /// Attach a new consumer, starting the broadcast worker if none is
    /// running. Must be called within a Tokio runtime.
    pub fn attach(&self) -> StreamHandle {
        let (sender, receiver) = mpsc::channel(self.shared.sink_capacity);
        let sink = Sink::new(sender);
        let id = sink.id();
        self.shared.listeners.add(sink);
        self.ensure_worker();
        StreamHandle::new(id, receiver, Arc::clone(&self.shared))
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    fn ensure_worker(&self) {
        let mut slot = self.shared.worker.lock();
        if slot.running {
            return;
        }
        slot.running = true;
        let ctx = WriterContext {
            lines: self.shared.line_rx.clone(),
            listeners: self.shared.listeners.clone(),
            slot: Arc::clone(&self.shared.worker),
            diagnostics: Arc::clone(&self.shared.diagnostics),
        };
        slot.handle = Some(tokio::spawn(broadcast::run(ctx)));
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("source", &self.shared.source)
            .field("node", &self.shared.node)
            .field("listeners", &self.shared.listeners.len())
            .finish()
    }
}

/// Builder for [`EventStream`] with explicit node identity, per-sink queue
/// capacity and an injected [`Diagnostics`] collaborator.
pub struct EventStreamBuilder {
    source: String,
    node: Option<String>,
    sink_capacity: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl EventStreamBuilder {
    fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            node: None,
            sink_capacity: DEFAULT_SINK_CAPACITY,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Override the node identity instead of resolving the hostname.
    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Queue capacity for each attached sink (clamped to at least 1).
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity;
        self
    }

    pub fn diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    pub fn build(self) -> EventStream {
        let node = self.node.unwrap_or_else(resolve_node);
        let (line_tx, line_rx) = flume::unbounded();
        EventStream {
            shared: Arc::new(Shared {
                source: self.source,
                node,
                line_tx,
                line_rx,
                listeners: ListenerSet::new(),
                worker: Arc::new(Mutex::new(WorkerSlot::default())),
                sink_capacity: self.sink_capacity.max(1),
                diagnostics: self.diagnostics,
            }),
        }
    }
}

fn resolve_node() -> String {
    System::host_name().unwrap_or_else(|| NODE_FALLBACK.to_string())
}
