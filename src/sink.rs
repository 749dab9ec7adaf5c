//! Sinks and the copy-on-write listener set.
//!
//! A [`Sink`] is the writer end of one consumer's attachment: a bounded
//! queue of pre-serialized lines. The [`ListenerSet`] holds the sinks
//! currently eligible for broadcast as an immutable snapshot behind an
//! atomic swap, so an in-flight broadcast pass never observes a
//! half-updated set and `add`/`remove` never wait on a slow write.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};
use uuid::Uuid;

/// One serialized wire record, shared across per-sink queues without copying.
pub type Line = Arc<str>;

/// Writer end of a consumer attachment.
///
/// Lines are enqueued whole: a line is either delivered in full or not at
/// all, never partially.
#[derive(Clone, Debug)]
pub struct Sink {
    id: Uuid,
    sender: mpsc::Sender<Line>,
}

impl Sink {
    pub fn new(sender: mpsc::Sender<Line>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Enqueue one line, waiting for queue space. Fails when the reader end
    /// is gone. Cancelling the returned future enqueues nothing.
    pub(crate) async fn forward(&self, line: Line) -> Result<(), mpsc::error::SendError<Line>> {
        self.sender.send(line).await
    }
}

/// The dynamically mutable collection of attached sinks.
///
/// `snapshot()` hands out the current immutable sequence; `add`/`remove`
/// build a replacement sequence under a lock scoped to the swap alone and
/// publish it atomically. Broadcast passes run entirely on a snapshot and
/// are never blocked by set mutation.
#[derive(Clone, Debug)]
pub struct ListenerSet {
    sinks: Arc<Mutex<Arc<[Sink]>>>,
    drained: Arc<Notify>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self {
            sinks: Arc::new(Mutex::new(Arc::from(Vec::new()))),
            drained: Arc::new(Notify::new()),
        }
    }

    /// The current immutable sequence of sinks. Non-blocking beyond the
    /// swap lock; the returned snapshot stays valid while mutations land.
    pub fn snapshot(&self) -> Arc<[Sink]> {
        Arc::clone(&self.sinks.lock())
    }

    pub fn add(&self, sink: Sink) {
        let mut current = self.sinks.lock();
        let mut next = current.to_vec();
        next.push(sink);
        *current = Arc::from(next);
    }

    /// Remove the sink with the given id, dropping its writer end. A no-op
    /// returning `false` when the id is not present.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut current = self.sinks.lock();
        if !current.iter().any(|sink| sink.id == id) {
            return false;
        }
        let next: Vec<Sink> = current.iter().filter(|sink| sink.id != id).cloned().collect();
        *current = Arc::from(next);
        drop(current);
        // Wake a broadcast worker parked between lines so an emptied set is
        // observed promptly rather than on the next emit.
        self.drained.notify_one();
        true
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Resolves after a removal signal. A signal sent before this is called
    /// is not lost (one permit is stored).
    pub(crate) async fn changed(&self) {
        self.drained.notified().await;
    }
}

impl Default for ListenerSet {
    fn default() -> Self {
        Self::new()
    }
}
