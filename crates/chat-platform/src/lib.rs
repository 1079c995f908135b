//! Browser platform adapters.
//!
//! Implements the `chat-core` port traits: the REST transport over
//! `fetch()` and the key/value storage backends.

pub mod http;
pub mod storage;

pub use http::HttpTransport;

#[cfg(test)]
mod tests;
