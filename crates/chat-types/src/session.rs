use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Server-assigned session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One conversation thread as listed in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Preview of the most recent message
    #[serde(default)]
    pub last_message: Option<String>,
    /// Timestamp of the most recent message
    #[serde(rename = "last_date", default)]
    pub last_timestamp: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, title: Option<String>) -> Self {
        Self {
            id: id.into(),
            title,
            created_at: None,
            last_message: None,
            last_timestamp: None,
        }
    }

    /// Copy the preview fields from a message exchanged in this session.
    pub fn touch(&mut self, msg: &Message) {
        self.last_message = Some(msg.text.clone());
        self.last_timestamp = Some(msg.created_at.clone());
    }
}
