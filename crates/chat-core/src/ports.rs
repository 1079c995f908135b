//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use chat_types::{
    Result,
    identity::{AuthReply, Credentials, Identity, ProfileUpdate, SignupDetails},
    message::{AssistantReply, Message},
    session::{Session, SessionId},
};

// ─── Identity Port ───────────────────────────────────────────

#[async_trait(?Send)]
pub trait IdentityPort {
    /// Who the service thinks we are
    async fn current_identity(&self) -> Result<Identity>;

    async fn create_account(&self, details: &SignupDetails) -> Result<AuthReply>;

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthReply>;

    /// Ask the service to drop the current login
    async fn invalidate_session(&self) -> Result<()>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthReply>;

    /// Forget any credentials held on the client side
    fn clear_credentials(&self);
}

// ─── Session Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait SessionPort {
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    async fn create_session(&self, title: Option<&str>) -> Result<Session>;

    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Full message log of one session, oldest first
    async fn session_log(&self, id: &SessionId) -> Result<Vec<Message>>;

    async fn send_message(&self, id: &SessionId, text: &str) -> Result<AssistantReply>;
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Session Lifecycle Hook ──────────────────────────────────

/// What the auth side may do to the session side on identity transitions.
#[async_trait(?Send)]
pub trait SessionLifecycle {
    /// Drop every piece of session state (logout, identity change)
    fn reset(&self);

    /// Refetch the session list for the newly confirmed identity.
    /// Failures are reported by the session side itself.
    async fn reload(&self);
}
