//! Chat session core — the state engine behind the chat UI.
//!
//! Two explicitly constructed containers: [`session_store::SessionStore`]
//! owns sessions and the active log, [`auth_store::AuthStore`] owns the
//! identity lifecycle and drives the session store through the
//! [`ports::SessionLifecycle`] hook. Build the session store first, then
//! hand it to the auth store.

pub mod ports;
pub mod event_bus;
pub mod optimistic;
pub mod session_store;
pub mod auth_store;
