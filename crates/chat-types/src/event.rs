use serde::{Deserialize, Serialize};

use crate::message::Place;
use crate::session::SessionId;

/// Authentication lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Unauthenticated,
    Checking,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible notification (toast)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Events emitted by the stores.
/// Presentation drains these to repaint and to show toasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// The session collection changed
    SessionsChanged,

    /// The active log changed (replaced, appended, or cleared)
    MessagesChanged { session_id: Option<SessionId> },

    /// The authentication state or identity changed
    AuthChanged { status: AuthStatus },

    /// An assistant reply referenced a place; passed through unmodified
    PlaceReferenced {
        session_id: SessionId,
        name: Option<String>,
        url: Option<String>,
        place: Place,
    },

    /// Toast side channel
    Notice(Notice),

    /// The remote rejected the identity during a session operation
    Unauthorized,
}
