//! Session store — the local cache of sessions and the active message log.
//!
//! Holds the session collection (display order, newest created first), the
//! active session id, the active log, and one busy flag per async concern.
//! All remote work goes through [`SessionPort`]; completions re-enter the
//! single thread and apply only if the view they were issued for is still
//! current (see [`crate::optimistic`]).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;

use chat_types::{
    ChatError, Result,
    event::{Notice, StoreEvent},
    message::{Message, MessageId, Place},
    session::{Session, SessionId},
};
use crate::event_bus::EventBus;
use crate::optimistic::{Epoch, MessageIdGen, touch_preview};
use crate::ports::{SessionLifecycle, SessionPort};

/// Everything presentation reads from the session side
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub sessions: Vec<Session>,
    pub active_session_id: Option<SessionId>,
    /// Log of the active session, in arrival order
    pub messages: Vec<Message>,
    pub is_sessions_loading: bool,
    pub is_messages_loading: bool,
    /// Sends still waiting for the assistant reply
    pub pending_sends: usize,
}

impl SessionState {
    pub fn is_sending(&self) -> bool {
        self.pending_sends > 0
    }
}

/// Counters guarding async completions.
#[derive(Debug, Default, Clone, Copy)]
struct Epochs {
    /// Bumped by reset; voids everything issued before it
    generation: Epoch,
    /// Bumped per list request; only the latest may apply
    list: Epoch,
    /// Bumped whenever the active pointer or log is replaced
    view: Epoch,
}

struct Inner {
    port: Rc<dyn SessionPort>,
    bus: EventBus,
    state: RefCell<SessionState>,
    epochs: RefCell<Epochs>,
    ids: MessageIdGen,
}

/// Shared handle — clone-cheap via Rc.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl SessionStore {
    pub fn new(port: Rc<dyn SessionPort>, bus: EventBus) -> Self {
        Self {
            inner: Rc::new(Inner {
                port,
                bus,
                state: RefCell::new(SessionState::default()),
                epochs: RefCell::new(Epochs::default()),
                ids: MessageIdGen::new(),
            }),
        }
    }

    // ─── Read projections ────────────────────────────────────

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.inner.state.borrow().sessions.clone()
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.inner.state.borrow().active_session_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.borrow().messages.clone()
    }

    pub fn is_sessions_loading(&self) -> bool {
        self.inner.state.borrow().is_sessions_loading
    }

    pub fn is_messages_loading(&self) -> bool {
        self.inner.state.borrow().is_messages_loading
    }

    pub fn is_sending(&self) -> bool {
        self.inner.state.borrow().is_sending()
    }

    // ─── Commands ────────────────────────────────────────────

    /// Replace the session collection with the service's list.
    /// On failure the previous collection is kept as it was.
    pub async fn list_sessions(&self) -> Result<()> {
        let ticket = {
            let mut epochs = self.inner.epochs.borrow_mut();
            epochs.list.bump();
            *epochs
        };
        self.inner.state.borrow_mut().is_sessions_loading = true;
        self.inner.bus.emit(StoreEvent::SessionsChanged);

        let result = self.inner.port.list_sessions().await;

        let current = {
            let epochs = self.inner.epochs.borrow();
            epochs.generation == ticket.generation && epochs.list == ticket.list
        };
        if !current {
            log::debug!("list_sessions: discarding stale completion");
            return result.map(|_| ());
        }

        let result = {
            let mut state = self.inner.state.borrow_mut();
            state.is_sessions_loading = false;
            result.map(|sessions| {
                log::info!("list_sessions: {} sessions", sessions.len());
                state.sessions = sessions;
            })
        };
        self.inner.bus.emit(StoreEvent::SessionsChanged);
        result.map_err(|e| self.fail("list_sessions", e))
    }

    /// Create a session on the service, then show it first and make it active.
    /// Nothing is inserted until the service has assigned the id.
    pub async fn create_session(&self, title: Option<&str>) -> Result<SessionId> {
        let generation = self.inner.epochs.borrow().generation;
        let title = title.map(str::trim).filter(|t| !t.is_empty());

        let result = self.inner.port.create_session(title).await;

        if self.inner.epochs.borrow().generation != generation {
            log::debug!("create_session: identity changed, not inserting");
            return result.map(|s| s.id);
        }

        let session = result.map_err(|e| self.fail("create_session", e))?;
        let id = session.id.clone();
        log::info!("create_session: {}", id);

        self.inner.epochs.borrow_mut().view.bump();
        {
            let mut state = self.inner.state.borrow_mut();
            state.sessions.retain(|s| s.id != id);
            state.sessions.insert(0, session);
            state.active_session_id = Some(id.clone());
            state.messages.clear();
            state.is_messages_loading = false;
        }
        self.inner.bus.emit(StoreEvent::SessionsChanged);
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: Some(id.clone()) });
        Ok(id)
    }

    /// Switch the active session and load its full log.
    ///
    /// `None` clears the selection immediately. Selecting the session that is
    /// already active refetches its log. If the log fails to load the session
    /// stays active with no history, so the caller can retry. Messages sent
    /// while the log is loading are kept after the fetched history.
    pub async fn select_session(&self, id: Option<SessionId>) -> Result<()> {
        let id = match id {
            Some(id) => id,
            None => {
                self.clear_selection();
                return Ok(());
            }
        };

        let ticket = {
            let mut epochs = self.inner.epochs.borrow_mut();
            epochs.view.bump();
            *epochs
        };
        {
            let mut state = self.inner.state.borrow_mut();
            state.active_session_id = Some(id.clone());
            state.messages.clear();
            state.is_messages_loading = true;
        }
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: Some(id.clone()) });

        let result = self.inner.port.session_log(&id).await;

        let current = {
            let epochs = self.inner.epochs.borrow();
            epochs.generation == ticket.generation && epochs.view == ticket.view
        };
        if !current {
            log::debug!("select_session: discarding stale log for {}", id);
            return result.map(|_| ());
        }

        // The log was cleared when this view began, so anything in it now was
        // appended by sends issued meanwhile. Those stay on top of the history.
        let result = {
            let mut state = self.inner.state.borrow_mut();
            state.is_messages_loading = false;
            result.map(|mut log| {
                let sent = std::mem::take(&mut state.messages);
                let known: HashSet<MessageId> = log.iter().map(|m| m.id).collect();
                log.extend(sent.into_iter().filter(|m| !known.contains(&m.id)));
                state.messages = log;
            })
        };
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: Some(id) });
        result.map_err(|e| self.fail("select_session", e))
    }

    pub fn clear_selection(&self) {
        self.inner.epochs.borrow_mut().view.bump();
        {
            let mut state = self.inner.state.borrow_mut();
            state.active_session_id = None;
            state.messages.clear();
            state.is_messages_loading = false;
        }
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: None });
    }

    /// Delete a session. Deleting an id that is not in the collection is a
    /// no-op; a 404 from the service counts as success.
    pub async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let known = self.inner.state.borrow().sessions.iter().any(|s| s.id == *id);
        if !known {
            log::debug!("delete_session: {} already absent", id);
            return Ok(());
        }

        let generation = self.inner.epochs.borrow().generation;
        let result = match self.inner.port.delete_session(id).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        };

        if self.inner.epochs.borrow().generation != generation {
            log::debug!("delete_session: identity changed, ignoring completion");
            return result;
        }
        result.map_err(|e| self.fail("delete_session", e))?;

        let was_active = {
            let mut state = self.inner.state.borrow_mut();
            state.sessions.retain(|s| s.id != *id);
            let was_active = state.active_session_id.as_ref() == Some(id);
            if was_active {
                state.active_session_id = None;
                state.messages.clear();
                state.is_messages_loading = false;
            }
            was_active
        };
        if was_active {
            self.inner.epochs.borrow_mut().view.bump();
            self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: None });
        }
        log::info!("delete_session: {}", id);
        self.inner.bus.emit(StoreEvent::SessionsChanged);
        self.inner.bus.notify(Notice::success("Session deleted"));
        Ok(())
    }

    /// Send a message in the active session.
    ///
    /// The user message is appended before the request goes out and is kept
    /// even if the request fails. The reply is filed under the session that
    /// was active at send time: it updates that session's preview, and is
    /// appended to the log only if that session is still the active one.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let session_id = match self.active_session_id() {
            Some(id) => id,
            None => return Err(self.fail("send_message", ChatError::NoActiveSession)),
        };
        let generation = self.inner.epochs.borrow().generation;

        let user_msg = Message::user(self.inner.ids.next(), text);
        {
            let mut state = self.inner.state.borrow_mut();
            touch_preview(&mut state.sessions, &session_id, &user_msg);
            state.messages.push(user_msg);
            state.pending_sends += 1;
        }
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: Some(session_id.clone()) });
        self.inner.bus.emit(StoreEvent::SessionsChanged);

        let result = self.inner.port.send_message(&session_id, text).await;

        if self.inner.epochs.borrow().generation != generation {
            log::debug!("send_message: identity changed, dropping reply for {}", session_id);
            return result.map(|_| ());
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                self.finish_send();
                self.inner.bus.emit(StoreEvent::SessionsChanged);
                return Err(self.fail("send_message", e));
            }
        };

        let assistant_msg = Message::assistant(self.inner.ids.next(), reply);
        let delivered = {
            let mut state = self.inner.state.borrow_mut();
            state.pending_sends = state.pending_sends.saturating_sub(1);
            touch_preview(&mut state.sessions, &session_id, &assistant_msg);
            let delivered = state.active_session_id.as_ref() == Some(&session_id);
            if delivered {
                state.messages.push(assistant_msg.clone());
            }
            delivered
        };

        if delivered {
            self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: Some(session_id.clone()) });
            if let Some(place) = assistant_msg.restaurant {
                self.emit_place(session_id, assistant_msg.name, assistant_msg.url, place);
            }
        } else {
            log::debug!("send_message: {} no longer active, reply kept in preview only", session_id);
        }
        self.inner.bus.emit(StoreEvent::SessionsChanged);
        Ok(())
    }

    /// Return the store to its initial state and void all in-flight work.
    pub fn reset_all(&self) {
        {
            let mut epochs = self.inner.epochs.borrow_mut();
            epochs.generation.bump();
            epochs.view.bump();
        }
        *self.inner.state.borrow_mut() = SessionState::default();
        log::info!("session store reset");
        self.inner.bus.emit(StoreEvent::SessionsChanged);
        self.inner.bus.emit(StoreEvent::MessagesChanged { session_id: None });
    }

    // ─── Helpers ─────────────────────────────────────────────

    fn finish_send(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.pending_sends = state.pending_sends.saturating_sub(1);
    }

    fn emit_place(&self, session_id: SessionId, name: Option<String>, url: Option<String>, place: Place) {
        self.inner.bus.emit(StoreEvent::PlaceReferenced { session_id, name, url, place });
    }

    /// Report a failed operation once and hand the error back.
    fn fail(&self, op: &str, err: ChatError) -> ChatError {
        log::warn!("{}: {}", op, err);
        self.inner.bus.notify(Notice::error(err.to_string()));
        if err.is_unauthorized() {
            self.inner.bus.emit(StoreEvent::Unauthorized);
        }
        err
    }
}

#[async_trait(?Send)]
impl SessionLifecycle for SessionStore {
    fn reset(&self) {
        self.reset_all();
    }

    async fn reload(&self) {
        // Errors already went out as a notice.
        let _ = self.list_sessions().await;
    }
}
