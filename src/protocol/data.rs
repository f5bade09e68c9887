use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// A [`Protocol`] represents the underlying data type used by
/// the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Protocol {
    Request(Request),
    Response(Response),
}

/// A [`Request`] represents requests from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    Set {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Clear,
    Query,
}

/// A [`Response`] represents a daemon's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Response {
    Set,
    Clear,
    Query {
        state: String,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        progress: f64,
        remaining: Duration,
        label: String,
        blink: bool,
        expired: bool,
    },
}
