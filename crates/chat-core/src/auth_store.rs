//! Auth store — the identity lifecycle that gates the session store.
//!
//! ```text
//!   start ──► Unauthenticated (seeded from storage) ──► Checking
//!   Checking ──ok──► Authenticated ──► sessions.reload()
//!   Checking ──err─► Unauthenticated, stored identity cleared, sessions.reset()
//!   login ──ok──► Authenticated ──► sessions.reset() + reload()
//!   signup ──ok─► Authenticated ──► sessions.reset()
//!   logout / expire ──► Unauthenticated ──► sessions.reset()
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use chat_types::{
    ChatError, Result,
    event::{AuthStatus, Notice, StoreEvent},
    identity::{AuthReply, Credentials, Identity, ProfileUpdate, SignupDetails},
};
use crate::event_bus::EventBus;
use crate::optimistic::Epoch;
use crate::ports::{IdentityPort, SessionLifecycle, StoragePort};

#[derive(Debug, Clone, Serialize)]
pub struct AuthState {
    pub status: AuthStatus,
    pub identity: Option<Identity>,
    pub is_signing_up: bool,
    pub is_logging_in: bool,
    pub is_updating_profile: bool,
    pub is_checking_auth: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            identity: None,
            is_signing_up: false,
            is_logging_in: false,
            is_updating_profile: false,
            is_checking_auth: false,
        }
    }
}

struct Inner {
    port: Rc<dyn IdentityPort>,
    storage: Rc<dyn StoragePort>,
    sessions: Rc<dyn SessionLifecycle>,
    bus: EventBus,
    identity_key: String,
    state: RefCell<AuthState>,
    /// Bumped on every applied identity transition
    epoch: Cell<Epoch>,
    /// Ticket of the most recently issued check
    latest_check: Cell<Epoch>,
}

#[derive(Clone)]
pub struct AuthStore {
    inner: Rc<Inner>,
}

impl AuthStore {
    pub fn new(
        port: Rc<dyn IdentityPort>,
        storage: Rc<dyn StoragePort>,
        sessions: Rc<dyn SessionLifecycle>,
        bus: EventBus,
        identity_key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                port,
                storage,
                sessions,
                bus,
                identity_key: identity_key.into(),
                state: RefCell::new(AuthState::default()),
                epoch: Cell::new(Epoch::default()),
                latest_check: Cell::new(Epoch::default()),
            }),
        }
    }

    // ─── Read projections ────────────────────────────────────

    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.inner.state.borrow().status
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_checking_auth(&self) -> bool {
        self.inner.state.borrow().is_checking_auth
    }

    // ─── Commands ────────────────────────────────────────────

    /// Process start: seed from the stored identity, then revalidate.
    pub async fn start(&self) -> Result<()> {
        self.restore().await;
        self.check_auth().await
    }

    /// Load the persisted identity, if any. The status stays
    /// `Unauthenticated` until the service confirms it.
    pub async fn restore(&self) -> Option<Identity> {
        let key = &self.inner.identity_key;
        let bytes = match self.inner.storage.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("restore: cannot read stored identity: {}", e);
                return None;
            }
        };
        match serde_json::from_slice::<Identity>(&bytes) {
            Ok(identity) => {
                log::info!("restore: seeded identity {}", identity.email);
                self.inner.state.borrow_mut().identity = Some(identity.clone());
                self.emit_changed();
                Some(identity)
            }
            Err(e) => {
                log::warn!("restore: discarding corrupt stored identity: {}", e);
                if let Err(e) = self.inner.storage.delete(key).await {
                    log::warn!("restore: {}", e);
                }
                None
            }
        }
    }

    /// Revalidate the identity against the service.
    pub async fn check_auth(&self) -> Result<()> {
        let ticket = self.bump_epoch();
        self.inner.latest_check.set(ticket);
        {
            let mut state = self.inner.state.borrow_mut();
            state.status = AuthStatus::Checking;
            state.is_checking_auth = true;
        }
        self.emit_changed();

        let result = self.inner.port.current_identity().await;

        if self.inner.epoch.get() != ticket {
            log::debug!("check_auth: identity changed meanwhile, ignoring result");
            // A newer check still in flight owns the flag.
            if self.inner.latest_check.get() == ticket {
                self.inner.state.borrow_mut().is_checking_auth = false;
                self.emit_changed();
            }
            return result.map(|_| ());
        }
        self.inner.state.borrow_mut().is_checking_auth = false;

        match result {
            Ok(identity) => {
                log::info!("check_auth: authenticated as {}", identity.email);
                self.apply_identity(identity).await;
                self.inner.sessions.reload().await;
                Ok(())
            }
            Err(e) => {
                // A rejection just means nobody is logged in; only other
                // failures are worth a toast.
                if e.is_unauthorized() {
                    log::info!("check_auth: {}", e);
                } else {
                    log::warn!("check_auth: {}", e);
                    self.inner.bus.notify(Notice::error(e.to_string()));
                }
                self.clear_identity().await;
                self.inner.sessions.reset();
                Err(e)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.update(|s| s.is_logging_in = true);
        let result = self.inner.port.authenticate(credentials).await;
        self.update(|s| s.is_logging_in = false);

        let reply = result.map_err(|e| self.report("login", e))?;
        self.accept_reply(reply, "Logged in").await;
        self.inner.sessions.reset();
        self.inner.sessions.reload().await;
        Ok(())
    }

    /// Create an account and sign in. No sessions are loaded: a new account
    /// has none until one is created explicitly.
    pub async fn signup(&self, details: &SignupDetails) -> Result<()> {
        self.update(|s| s.is_signing_up = true);
        let result = self.inner.port.create_account(details).await;
        self.update(|s| s.is_signing_up = false);

        let reply = result.map_err(|e| self.report("signup", e))?;
        self.accept_reply(reply, "Account created").await;
        self.inner.sessions.reset();
        Ok(())
    }

    /// Log out. The remote invalidation is best-effort: its error is reported
    /// and returned, but local cleanup always happens.
    pub async fn logout(&self) -> Result<()> {
        let remote = self.inner.port.invalidate_session().await;
        if let Err(e) = &remote {
            log::warn!("logout: {}", e);
            self.inner.bus.notify(Notice::error(e.to_string()));
        }

        self.inner.port.clear_credentials();
        self.bump_epoch();
        self.clear_identity().await;
        self.inner.sessions.reset();
        log::info!("logout: done");
        self.inner.bus.notify(Notice::success("Logged out"));
        remote
    }

    /// Change profile fields. The auth status is not touched.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let ticket = self.inner.epoch.get();
        self.update(|s| s.is_updating_profile = true);
        let result = self.inner.port.update_profile(update).await;
        self.update(|s| s.is_updating_profile = false);

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let e = self.report("update_profile", e);
                if e.is_unauthorized() {
                    self.expire().await;
                }
                return Err(e);
            }
        };
        if self.inner.epoch.get() != ticket {
            log::debug!("update_profile: identity changed meanwhile, not applying");
            return Ok(());
        }

        self.inner.state.borrow_mut().identity = Some(reply.identity.clone());
        self.persist(&reply.identity).await;
        self.emit_changed();
        self.inner.bus.notify(Notice::success(
            reply.message.unwrap_or_else(|| "Profile updated".to_string()),
        ));
        Ok(())
    }

    /// The service rejected our identity mid-session: drop it and everything
    /// that belonged to it.
    pub async fn expire(&self) {
        log::info!("expire: identity rejected by the service");
        self.bump_epoch();
        self.clear_identity().await;
        self.inner.sessions.reset();
    }

    // ─── Helpers ─────────────────────────────────────────────

    fn bump_epoch(&self) -> Epoch {
        let mut epoch = self.inner.epoch.get();
        let next = epoch.bump();
        self.inner.epoch.set(next);
        next
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        f(&mut *self.inner.state.borrow_mut());
        self.emit_changed();
    }

    async fn accept_reply(&self, reply: AuthReply, fallback: &str) {
        self.bump_epoch();
        log::info!("authenticated as {}", reply.identity.email);
        self.apply_identity(reply.identity).await;
        self.inner.bus.notify(Notice::success(
            reply.message.unwrap_or_else(|| fallback.to_string()),
        ));
    }

    async fn apply_identity(&self, identity: Identity) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.status = AuthStatus::Authenticated;
            state.identity = Some(identity.clone());
        }
        self.emit_changed();
        self.persist(&identity).await;
    }

    async fn clear_identity(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.status = AuthStatus::Unauthenticated;
            state.identity = None;
        }
        self.emit_changed();
        if let Err(e) = self.inner.storage.delete(&self.inner.identity_key).await {
            log::warn!("cannot clear stored identity: {}", e);
        }
    }

    async fn persist(&self, identity: &Identity) {
        let bytes = match serde_json::to_vec(identity) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("cannot encode identity: {}", e);
                return;
            }
        };
        if let Err(e) = self.inner.storage.set(&self.inner.identity_key, &bytes).await {
            log::warn!("cannot store identity: {}", e);
        }
    }

    fn report(&self, op: &str, err: ChatError) -> ChatError {
        log::warn!("{}: {}", op, err);
        self.inner.bus.notify(Notice::error(err.to_string()));
        err
    }

    fn emit_changed(&self) {
        let status = self.inner.state.borrow().status;
        self.inner.bus.emit(StoreEvent::AuthChanged { status });
    }
}
