use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /api/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub message: String,
    pub status: u16,
    pub timestamp: String,
}

impl ServiceStatus {
    /// Healthy status stamped with the current instant.
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 200,
            timestamp: now_iso8601(),
        }
    }
}

/// Current UTC instant as RFC 3339 with millisecond precision, e.g.
/// `2024-05-01T10:20:30.123Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
