use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification as pushed over the socket and returned by the REST API.
///
/// Only the read flag is ever mutated client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Server-assigned identifier
    pub id: i64,

    pub title: String,

    /// Notification body
    pub message: String,

    /// Read status
    pub is_read: bool,

    /// Creation timestamp (ISO-8601 on the wire)
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Parse a single socket frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One page of the notification list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: u64,
    #[serde(default)]
    pub unread_count: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Unread counter payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: u64,
}

/// Response envelope used by every platform REST endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Human-readable failure reason, preferring `error` over `message`
    pub fn failure_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}
