//! The JavaScript-facing client handle. Owns both stores and the event bus.
//!
//! Commands return Promises that resolve once the store has applied the
//! outcome; presentation re-reads the snapshots after draining events.

use std::fmt::Display;
use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use chat_core::auth_store::AuthStore;
use chat_core::event_bus::EventBus;
use chat_core::ports::{IdentityPort, SessionPort, StoragePort};
use chat_core::session_store::SessionStore;
use chat_platform::storage::open_storage;
use chat_platform::HttpTransport;
use chat_types::{
    config::ClientConfig,
    event::StoreEvent,
    identity::{Credentials, ProfileUpdate, SignupDetails},
    session::SessionId,
};

#[wasm_bindgen]
pub struct ChatClient {
    bus: EventBus,
    sessions: SessionStore,
    auth: AuthStore,
}

#[wasm_bindgen]
impl ChatClient {
    /// `config` is an optional plain object; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ChatClient, JsValue> {
        let config = read_config(&config)?;
        log::info!("ChatClient: api {}, storage {:?}", config.api_base, config.storage);

        let transport = Rc::new(HttpTransport::new(config.clone()));
        let storage = open_storage(&config.storage).map_err(to_js)?;
        Ok(Self::assemble(&config, transport.clone(), transport, storage))
    }

    // ─── Auth commands ───────────────────────────────────────

    /// Restore the stored identity, then revalidate it.
    pub fn start(&self) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move { settle(auth.start().await) })
    }

    #[wasm_bindgen(js_name = checkAuth)]
    pub fn check_auth(&self) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move { settle(auth.check_auth().await) })
    }

    pub fn login(&self, email: String, password: String) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move {
            settle(auth.login(&Credentials { email, password }).await)
        })
    }

    pub fn signup(&self, name: String, email: String, password: String) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move {
            settle(auth.signup(&SignupDetails { name, email, password }).await)
        })
    }

    pub fn logout(&self) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move { settle(auth.logout().await) })
    }

    #[wasm_bindgen(js_name = updateProfile)]
    pub fn update_profile(&self, update: JsValue) -> Promise {
        let auth = self.auth.clone();
        future_to_promise(async move {
            let update: ProfileUpdate = update.into_serde().map_err(to_js)?;
            settle(auth.update_profile(&update).await)
        })
    }

    // ─── Session commands ────────────────────────────────────

    #[wasm_bindgen(js_name = listSessions)]
    pub fn list_sessions(&self) -> Promise {
        let sessions = self.sessions.clone();
        future_to_promise(async move { settle(sessions.list_sessions().await) })
    }

    /// Resolves to the new session's id.
    #[wasm_bindgen(js_name = createSession)]
    pub fn create_session(&self, title: Option<String>) -> Promise {
        let sessions = self.sessions.clone();
        future_to_promise(async move {
            let id = sessions.create_session(title.as_deref()).await.map_err(to_js)?;
            Ok(JsValue::from_str(id.as_str()))
        })
    }

    /// Pass `undefined` to clear the selection.
    #[wasm_bindgen(js_name = selectSession)]
    pub fn select_session(&self, id: Option<String>) -> Promise {
        let sessions = self.sessions.clone();
        future_to_promise(async move {
            settle(sessions.select_session(id.map(SessionId::from)).await)
        })
    }

    #[wasm_bindgen(js_name = deleteSession)]
    pub fn delete_session(&self, id: String) -> Promise {
        let sessions = self.sessions.clone();
        future_to_promise(async move {
            settle(sessions.delete_session(&SessionId::from(id)).await)
        })
    }

    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, text: String) -> Promise {
        let sessions = self.sessions.clone();
        future_to_promise(async move { settle(sessions.send_message(&text).await) })
    }

    // ─── Read projections ────────────────────────────────────

    #[wasm_bindgen(js_name = sessionSnapshot)]
    pub fn session_snapshot(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.sessions.snapshot()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = authSnapshot)]
    pub fn auth_snapshot(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.auth.snapshot()).map_err(to_js)
    }

    /// Take every pending event. A rejected identity is expired before the
    /// events are handed over; the resulting state changes arrive with the
    /// next drain.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        let events = self.bus.drain();
        if events.iter().any(|e| matches!(e, StoreEvent::Unauthorized)) {
            let auth = self.auth.clone();
            spawn_local(async move { auth.expire().await });
        }
        JsValue::from_serde(&events).map_err(to_js)
    }
}

impl ChatClient {
    /// Wire stores around the given ports. The session store is built
    /// first; the auth store drives it through the lifecycle hook.
    pub fn assemble(
        config: &ClientConfig,
        identity: Rc<dyn IdentityPort>,
        remote: Rc<dyn SessionPort>,
        storage: Rc<dyn StoragePort>,
    ) -> Self {
        log::info!("Storage backend: {}", storage.backend_name());
        let bus = EventBus::new();
        let sessions = SessionStore::new(remote, bus.clone());
        let auth = AuthStore::new(
            identity,
            storage,
            Rc::new(sessions.clone()),
            bus.clone(),
            config.identity_key.clone(),
        );
        Self { bus, sessions, auth }
    }
}

fn read_config(value: &JsValue) -> Result<ClientConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ClientConfig::default());
    }
    value.into_serde().map_err(to_js)
}

fn settle(result: chat_types::Result<()>) -> Result<JsValue, JsValue> {
    result.map(|_| JsValue::UNDEFINED).map_err(to_js)
}

fn to_js(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
