use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("No active session: create or select a session first")]
    NoActiveSession,

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),
}

/// Coarse classification used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, no network call was made.
    Validation,
    /// Network or remote failure; state stays at last-known-good.
    Transport,
    /// The remote rejected the identity.
    Authentication,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::NoActiveSession => ErrorKind::Validation,
            ChatError::Unauthorized(_) => ErrorKind::Authentication,
            _ => ErrorKind::Transport,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// A remote 404, which deletion treats as already done.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatError::Remote { status: 404, .. })
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
