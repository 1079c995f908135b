use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a message within a session log.
///
/// Locally authored messages get a time-based id; logs fetched from the
/// service carry the service's row id. Only used for list keys and ordering.
pub type MessageId = i64;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    /// Referenced place name (assistant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Link for the referenced place (assistant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Structured place payload consumed by the map view (assistant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Place>,
}

/// A place recommended by the assistant.
///
/// Only `name` is required; everything else the service sends is kept,
/// including fields this client does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Place {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            rating: None,
            reviews: None,
            latitude: None,
            longitude: None,
            place_id: None,
            extra: Map::new(),
        }
    }
}

/// Reply payload returned by send-message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(rename = "message")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Place>,
}

impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            name: None,
            restaurant: None,
        }
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.restaurant = Some(place);
        self
    }
}

impl Message {
    /// A user message stamped with the current time.
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            created_at: now_rfc3339(),
            name: None,
            url: None,
            restaurant: None,
        }
    }

    /// An assistant message built from a reply, stamped with its arrival time.
    pub fn assistant(id: MessageId, reply: AssistantReply) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: reply.text,
            created_at: now_rfc3339(),
            name: reply.name,
            url: reply.url,
            restaurant: reply.restaurant,
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
