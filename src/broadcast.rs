//! The broadcast writer: one background task per active stream.
//!
//! The worker reads pre-serialized lines from the stream's internal channel
//! and fans each line out to the current listener snapshot, with one fixed
//! deadline covering the whole per-line attempt. A slow or dead consumer
//! costs at most one deadline per line and never stalls delivery to healthy
//! consumers or to future lines.
//!
//! Lifecycle per stream: Idle (no sinks, no task) → Active (task running) →
//! Draining (empty snapshot observed, task exits) → Idle. A later attach
//! spawns a fresh task.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::diagnostics::Diagnostics;
use crate::sink::{Line, ListenerSet, Sink};

/// Upper bound for fanning one line out to every attached sink.
pub const BROADCAST_DEADLINE: Duration = Duration::from_millis(500);

/// Lifecycle slot shared between attach (spawn side) and the worker
/// (retire side). Spawn and retire decisions both happen under this lock,
/// which closes the race between a retiring worker and a concurrent attach.
#[derive(Debug, Default)]
pub(crate) struct WorkerSlot {
    pub(crate) running: bool,
    pub(crate) handle: Option<JoinHandle<()>>,
}

pub(crate) struct WriterContext {
    pub(crate) lines: flume::Receiver<Line>,
    pub(crate) listeners: ListenerSet,
    pub(crate) slot: Arc<Mutex<WorkerSlot>>,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
}

pub(crate) async fn run(ctx: WriterContext) {
    ctx.diagnostics.worker_started();
    loop {
        tokio::select! {
            _ = ctx.listeners.changed() => {
                if try_retire(&ctx) {
                    break;
                }
            }
            recv = ctx.lines.recv_async() => match recv {
                Ok(line) => {
                    let snapshot = ctx.listeners.snapshot();
                    if snapshot.is_empty() {
                        if try_retire(&ctx) {
                            break;
                        }
                        continue;
                    }
                    broadcast_line(&snapshot, line, &ctx.diagnostics).await;
                }
                Err(_) => {
                    // Producer and every handle are gone; nothing can arrive.
                    retire(&ctx);
                    break;
                }
            }
        }
    }
    ctx.diagnostics.worker_stopped();
}

/// Exit iff the set is still empty under the lifecycle lock. An attach that
/// lands first either keeps this worker alive (sink visible here) or finds
/// `running == false` and spawns a replacement.
fn try_retire(ctx: &WriterContext) -> bool {
    let mut slot = ctx.slot.lock();
    if !ctx.listeners.is_empty() {
        return false;
    }
    // Discard queued lines so the next attachment starts from a clean
    // suffix of the stream instead of replaying a backlog.
    while ctx.lines.try_recv().is_ok() {}
    slot.running = false;
    slot.handle = None;
    true
}

fn retire(ctx: &WriterContext) {
    let mut slot = ctx.slot.lock();
    slot.running = false;
    slot.handle = None;
}

/// Write one line to every sink in the snapshot, concurrently, under one
/// deadline for the whole set. A failed write is reported and swallowed;
/// the sink keeps its slot until an explicit detach. On deadline, pending
/// writes are abandoned — a cancelled write enqueues nothing, so a sink
/// either receives the line in full or not at all.
async fn broadcast_line(snapshot: &[Sink], line: Line, diagnostics: &Arc<dyn Diagnostics>) {
    let writes = snapshot.iter().map(|sink| {
        let line = Line::clone(&line);
        async move { sink.forward(line).await.err().map(|_| sink.id()) }
    });

    match timeout(BROADCAST_DEADLINE, join_all(writes)).await {
        Ok(outcomes) => {
            for sink in outcomes.into_iter().flatten() {
                diagnostics.sink_write_failed(sink);
            }
        }
        Err(_) => diagnostics.broadcast_deadline_exceeded(snapshot.len()),
    }
}
