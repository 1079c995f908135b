//! HTTP transport adapter.
//!
//! Implements `IdentityPort` and `SessionPort` against the chat service's
//! REST API. Uses browser `fetch()` via gloo-net for WASM compatibility.
//! Every request carries credentials: the service keeps the login in an
//! http-only cookie, so the client never sees a token.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use wasm_bindgen::JsCast;
use web_sys::{FormData, HtmlDocument, RequestCredentials};

use chat_core::ports::{IdentityPort, SessionPort};
use chat_types::{
    ChatError, Result,
    config::ClientConfig,
    identity::{AuthReply, Credentials, Identity, ProfileUpdate, SignupDetails},
    message::{AssistantReply, Message},
    session::{Session, SessionId},
};

pub struct HttpTransport {
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    fn session_url(&self, id: &SessionId, suffix: &str) -> String {
        let id = String::from(js_sys::encode_uri_component(id.as_str()));
        self.url(&format!("/api/sessions/{}{}", id, suffix))
    }
}

fn with_credentials(builder: RequestBuilder) -> RequestBuilder {
    builder.credentials(RequestCredentials::Include)
}

/// Send a request; non-2xx statuses become errors carrying the service's message.
async fn dispatch(request: Request) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ChatError::Network(e.to_string()))?;

    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let status_text = response.status_text();
    let body = response.text().await.unwrap_or_default();
    Err(error_from_response(status, &status_text, &body))
}

async fn body_text(response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| ChatError::Network(e.to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = body_text(response).await?;
    Ok(serde_json::from_str(&text)?)
}

fn json_request(builder: RequestBuilder, body: &Value) -> Result<Request> {
    with_credentials(builder)
        .json(body)
        .map_err(|e| ChatError::Serialization(e.to_string()))
}

fn bare_request(builder: RequestBuilder) -> Result<Request> {
    with_credentials(builder)
        .build()
        .map_err(|e| ChatError::Network(e.to_string()))
}

// ─── Wire helpers ────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a failed response to an error. The service explains failures as
/// `{"detail": ...}` or `{"message": ...}`; the status text is the fallback.
pub fn error_from_response(status: u16, status_text: &str, body: &str) -> ChatError {
    let explained = serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| {
        let detail = b.detail.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        });
        detail.or(b.message)
    });
    let message = match explained {
        Some(m) if !m.trim().is_empty() => m,
        _ if !status_text.is_empty() => status_text.to_string(),
        _ => "request failed".to_string(),
    };

    if status == 401 {
        ChatError::Unauthorized(message)
    } else {
        ChatError::Remote { status, message }
    }
}

#[derive(Deserialize)]
struct StatusReply {
    #[serde(default = "yes")]
    logged_in: bool,
    id: i64,
    email: String,
    #[serde(default)]
    name: String,
}

fn yes() -> bool {
    true
}

/// Parse the body of `GET /api/status`.
pub fn parse_status(body: &str) -> Result<Identity> {
    let reply: StatusReply = serde_json::from_str(body)?;
    if !reply.logged_in {
        return Err(ChatError::Unauthorized("not logged in".to_string()));
    }
    Ok(Identity { id: reply.id, email: reply.email, name: reply.name })
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Identity>,
}

/// Parse the `{success, message, data}` envelope of signup, login and
/// profile update.
pub fn parse_auth_envelope(body: &str) -> Result<AuthReply> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let identity = envelope
        .data
        .ok_or_else(|| ChatError::Serialization("reply carries no identity".to_string()))?;
    Ok(AuthReply { identity, message: envelope.message })
}

// ─── IdentityPort ────────────────────────────────────────────

#[async_trait(?Send)]
impl IdentityPort for HttpTransport {
    async fn current_identity(&self) -> Result<Identity> {
        let request = bare_request(Request::get(&self.url("/api/status")))?;
        let body = body_text(dispatch(request).await?).await?;
        parse_status(&body)
    }

    async fn create_account(&self, details: &SignupDetails) -> Result<AuthReply> {
        let body = json!({
            "name": details.name,
            "email": details.email,
            "password": details.password,
        });
        let request = json_request(Request::post(&self.url("/api/signup")), &body)?;
        let body = body_text(dispatch(request).await?).await?;
        parse_auth_envelope(&body)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthReply> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let request = json_request(Request::post(&self.url("/api/login")), &body)?;
        let body = body_text(dispatch(request).await?).await?;
        parse_auth_envelope(&body)
    }

    async fn invalidate_session(&self) -> Result<()> {
        let request = bare_request(Request::post(&self.url("/api/logout")))?;
        dispatch(request).await?;
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthReply> {
        let body = serde_json::to_value(update)?;
        let request = json_request(Request::put(&self.url("/api/update-profile")), &body)?;
        let body = body_text(dispatch(request).await?).await?;
        parse_auth_envelope(&body)
    }

    fn clear_credentials(&self) {
        let cookie = format!(
            "{}=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.config.session_cookie
        );
        let document = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<HtmlDocument>().ok());
        match document {
            Some(doc) => {
                if let Err(e) = doc.set_cookie(&cookie) {
                    log::warn!("clear_credentials: {:?}", e);
                }
            }
            None => log::debug!("clear_credentials: no document, nothing to clear"),
        }
    }
}

// ─── SessionPort ─────────────────────────────────────────────

#[async_trait(?Send)]
impl SessionPort for HttpTransport {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let request = bare_request(Request::get(&self.url("/api/sessions")))?;
        decode(dispatch(request).await?).await
    }

    async fn create_session(&self, title: Option<&str>) -> Result<Session> {
        let body = json!({ "title": title });
        let request = json_request(Request::post(&self.url("/api/sessions")), &body)?;
        decode(dispatch(request).await?).await
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let request = bare_request(Request::delete(&self.session_url(id, "")))?;
        dispatch(request).await?;
        Ok(())
    }

    async fn session_log(&self, id: &SessionId) -> Result<Vec<Message>> {
        let request = bare_request(Request::get(&self.session_url(id, "/logs")))?;
        decode(dispatch(request).await?).await
    }

    async fn send_message(&self, id: &SessionId, text: &str) -> Result<AssistantReply> {
        let form = FormData::new().map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;
        form.append_with_str("message", text)
            .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;
        form.append_with_str("session_id", id.as_str())
            .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;

        let request = with_credentials(Request::post(&self.url("/get_response")))
            .body(form)
            .map_err(|e| ChatError::Network(e.to_string()))?;
        decode(dispatch(request).await?).await
    }
}
