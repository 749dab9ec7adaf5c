//! A consumer's attachment to a stream.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::diagnostics::Diagnostics;
use crate::event::{Event, EventKind};
use crate::sink::Line;
use crate::stream::Shared;
use crate::waiter::{self, WaitTimeout};

/// Reader end of one consumer's attachment.
///
/// Holds the sink's receive side exclusively; the paired writer end lives
/// in the stream's listener set until [`detach`](StreamHandle::detach).
/// Dropping the handle detaches it.
pub struct StreamHandle {
    sink: Uuid,
    receiver: mpsc::Receiver<Line>,
    shared: Arc<Shared>,
    detached: bool,
}

impl StreamHandle {
    pub(crate) fn new(sink: Uuid, receiver: mpsc::Receiver<Line>, shared: Arc<Shared>) -> Self {
        Self {
            sink,
            receiver,
            shared,
            detached: false,
        }
    }

    pub fn sink_id(&self) -> Uuid {
        self.sink
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Remove this consumer from the stream and close its writer end, so
    /// reads observe end-of-stream once already-delivered lines are
    /// drained. Idempotent; safe while a broadcast to this sink is in
    /// flight (that write completes, fails, or is abandoned by the
    /// broadcast deadline).
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.shared.listeners.remove(self.sink);
    }

    /// Next serialized record, in emit order. `None` means end-of-stream:
    /// the handle was detached (and its queue drained) or the stream is
    /// gone.
    pub async fn next_line(&mut self) -> Option<String> {
        self.receiver.recv().await.map(|line| line.to_string())
    }

    /// Scan this handle's stream for the first event with the given kind
    /// and exact message, decoding one record at a time. See
    /// [`waiter::wait_for`].
    pub async fn wait_for(
        &mut self,
        kind: EventKind,
        message: &str,
        timeout: Duration,
    ) -> Result<Event, WaitTimeout> {
        waiter::wait_for(self, kind, message, timeout).await
    }

    pub(crate) fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.shared.diagnostics
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("sink", &self.sink)
            .field("detached", &self.detached)
            .finish()
    }
}
