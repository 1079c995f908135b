use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat service
    pub api_base: String,
    /// Client-storage key holding the persisted identity
    pub identity_key: String,
    /// Name of the credential cookie expired on logout
    pub session_cookie: String,
    pub storage: StorageBackendType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            identity_key: "authUser".to_string(),
            session_cookie: "token".to_string(),
            storage: StorageBackendType::Auto,
        }
    }
}

impl ClientConfig {
    /// Join `api_base` and `path` with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Auto-detect best available backend
    Auto,
    Memory,
    LocalStorage,
}

const DEFAULT_API_BASE: &str = "http://localhost:5000";
