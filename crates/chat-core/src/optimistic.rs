//! Bookkeeping shared by the stores for optimistic updates and for telling
//! current completions from stale ones.
//!
//! Execution is single-threaded but requests overlap. Every async operation
//! snapshots the counters it depends on before its first await and compares
//! them again when the reply lands; a mismatch means the reply belongs to a
//! view or identity that is gone, and it must not touch shared state.

use std::cell::Cell;

use chat_types::{
    message::{Message, MessageId},
    session::{Session, SessionId},
};

/// Monotonic counter. Bumping it invalidates every snapshot taken earlier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

impl Epoch {
    pub fn bump(&mut self) -> Epoch {
        self.0 = self.0.wrapping_add(1);
        *self
    }
}

/// Generates ids for locally authored messages.
///
/// Ids are millisecond timestamps, nudged forward when two messages are
/// created within the same millisecond, so they stay unique and ordered.
#[derive(Debug, Default)]
pub struct MessageIdGen {
    last: Cell<MessageId>,
}

impl MessageIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis();
        let id = now.max(self.last.get() + 1);
        self.last.set(id);
        id
    }
}

/// Mirror a message into the preview fields of its session.
/// Returns false if the session is no longer in the collection.
pub fn touch_preview(sessions: &mut [Session], id: &SessionId, msg: &Message) -> bool {
    match sessions.iter_mut().find(|s| s.id == *id) {
        Some(session) => {
            session.touch(msg);
            true
        }
        None => false,
    }
}
