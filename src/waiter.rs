//! Blocking wait for a specific event on an attached handle.

use std::future;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tokio::time;

use crate::event::{Event, EventKind};
use crate::handle::StreamHandle;

/// The requested event was not observed within the wait window.
#[derive(Clone, Debug, Error, Diagnostic)]
#[error("no {kind} event matching {message:?} observed within {timeout:?}")]
#[diagnostic(code(hydrant::wait_timeout))]
pub struct WaitTimeout {
    pub kind: EventKind,
    pub message: String,
    pub timeout: Duration,
}

/// Scan `handle`'s stream until an event with the given kind and exact
/// message appears, or `timeout` elapses.
///
/// The scan decodes one record at a time from the handle's current reader
/// position; a successful return consumes everything up to and including
/// the match, so consecutive calls resume where the previous one stopped.
/// On timeout the scan is cancelled at its next await point and no further
/// decoding happens.
///
/// An undecodable record leaves the stream position unrecoverable: the scan
/// stops decoding, holds until the deadline and surfaces the timeout rather
/// than a distinct error. Likewise for end-of-stream.
pub async fn wait_for(
    handle: &mut StreamHandle,
    kind: EventKind,
    message: &str,
    timeout: Duration,
) -> Result<Event, WaitTimeout> {
    let scan = async {
        loop {
            match handle.next_line().await {
                Some(line) => match Event::from_line(&line) {
                    Ok(event) if event.matches(kind, message) => return event,
                    Ok(_) => {}
                    Err(err) => {
                        handle.diagnostics().decode_failed(&err);
                        future::pending::<()>().await;
                    }
                },
                None => future::pending::<()>().await,
            }
        }
    };

    match time::timeout(timeout, scan).await {
        Ok(event) => Ok(event),
        Err(_) => Err(WaitTimeout {
            kind,
            message: message.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::diagnostics::{DiagnosticDetail, MemoryDiagnostics};
    use crate::event::EventKind;
    use crate::stream::EventStream;

    // An undecodable record terminates the scan: the matching event queued
    // behind it is never reached and the caller sees the timeout.
    #[tokio::test]
    async fn scan_stops_on_undecodable_record() {
        let diagnostics = MemoryDiagnostics::new();
        let stream = EventStream::builder("scan")
            .diagnostics(diagnostics.clone())
            .build();
        let mut handle = stream.attach();

        let snapshot = stream.shared().listeners.snapshot();
        snapshot[0].forward("not a record".into()).await.unwrap();
        stream.info("after-corruption");

        let started = Instant::now();
        let err = handle
            .wait_for(
                EventKind::Info,
                "after-corruption",
                Duration::from_millis(300),
            )
            .await
            .unwrap_err();

        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(err.timeout, Duration::from_millis(300));
        assert_eq!(err.kind, EventKind::Info);
        assert!(diagnostics.any(|d| matches!(d, DiagnosticDetail::DecodeFailed { .. })));
    }
}
