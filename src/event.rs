use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity/category of a published event.
///
/// Serialized as the literal variant name (`Info`, `Warning`, `Metric`,
/// `Error`) so any line consumer can match on it without a schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Info,
    Warning,
    Metric,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Info => "Info",
            EventKind::Warning => "Warning",
            EventKind::Metric => "Metric",
            EventKind::Error => "Error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied content of an event: a message plus an ordered list of
/// payload values, each serialized individually.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBody {
    pub message: String,
    #[serde(default)]
    pub payload: Vec<Value>,
}

/// One published occurrence. Immutable once constructed.
///
/// # Wire format
///
/// An event serializes to exactly one compact JSON object, one record per
/// line, no unescaped newlines:
///
/// ```json
/// {
///   "type": "Info",
///   "source": "svc",
///   "node": "host-1",
///   "timestamp": "2026-08-06T12:34:56.789Z",
///   "body": { "message": "ready", "payload": [] }
/// }
/// ```
///
/// Any consumer that can split lines and parse JSON can decode the stream,
/// independent of process or language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub source: String,
    pub node: String,
    pub timestamp: DateTime<Utc>,
    pub body: EventBody,
}

impl Event {
    /// Construct an event stamped with the current time.
    pub fn new(
        kind: EventKind,
        source: impl Into<String>,
        node: impl Into<String>,
        message: impl Into<String>,
        payload: Vec<Value>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            node: node.into(),
            timestamp: Utc::now(),
            body: EventBody {
                message: message.into(),
                payload,
            },
        }
    }

    /// Serialize to one line of the wire format (no trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a single wire-format line back into an event.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// True when kind and message both match exactly.
    pub fn matches(&self, kind: EventKind, message: &str) -> bool {
        self.kind == kind && self.body.message == message
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}@{}: {}",
            self.kind, self.source, self.node, self.body.message
        )
    }
}
