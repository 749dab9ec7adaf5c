//! # Hydrant: an in-process event-publishing bus
//!
//! A producer emits typed, structured events (info/warning/metric/error)
//! tagged with source, node and timestamp; any number of consumers attach
//! dynamically to receive a live, newline-delimited JSON stream of those
//! events, and detach at will. A consumer can also block waiting for a
//! specific event with a timeout.
//!
//! The heart of the crate is the fan-out writer: a single background task
//! per stream that serializes events once and broadcasts each line to the
//! current set of attached sinks under a fixed per-line deadline, so a
//! frozen consumer costs bounded latency instead of stalling the bus.
//! Attach and detach swap an immutable listener snapshot and never wait on
//! an in-flight broadcast.
//!
//! ## Quick start
//!
//! ```
//! use std::time::Duration;
//! use hydrant::{EventKind, EventStream};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stream = EventStream::new("svc");
//! let mut tap = stream.attach();
//!
//! stream.info("ready");
//! stream.metric_with("latency", [serde_json::json!({"p50_ms": 12})]);
//!
//! let event = tap
//!     .wait_for(EventKind::Info, "ready", Duration::from_secs(1))
//!     .await
//!     .expect("event already in flight");
//! assert_eq!(event.body.message, "ready");
//!
//! tap.detach();
//! # }
//! ```
//!
//! ## Delivery model
//!
//! - Each consumer sees a suffix of the stream's total emit order, in
//!   order. There is no replay: events emitted with no consumers attached
//!   are discarded, not buffered.
//! - Delivery to a slow consumer is bounded by
//!   [`BROADCAST_DEADLINE`](broadcast::BROADCAST_DEADLINE) per line; lines
//!   that miss the deadline are dropped for the laggard only.
//! - Emitting never fails observably. Degradations are reported to the
//!   stream's injected [`Diagnostics`] collaborator.
//!
//! ## Module guide
//!
//! - [`event`] — the event model and its one-line JSON wire codec
//! - [`stream`] — producer surface: emit operations, attach, lifecycle
//! - [`handle`] — consumer surface: reading lines, detaching
//! - [`waiter`] — blocking wait for a matching event
//! - [`sink`] — sinks and the copy-on-write listener set
//! - [`broadcast`] — the deadline-bounded fan-out worker
//! - [`diagnostics`] — injected observability collaborators

pub mod broadcast;
pub mod diagnostics;
pub mod event;
pub mod handle;
pub mod sink;
pub mod stream;
pub mod waiter;

pub use broadcast::BROADCAST_DEADLINE;
pub use diagnostics::{
    DiagnosticDetail, Diagnostics, MemoryDiagnostics, StreamDiagnostic, TracingDiagnostics,
};
pub use event::{Event, EventBody, EventKind};
pub use handle::StreamHandle;
pub use sink::{Line, ListenerSet, Sink};
pub use stream::{EventStream, EventStreamBuilder, NODE_FALLBACK};
pub use waiter::{WaitTimeout, wait_for};
