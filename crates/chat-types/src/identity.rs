use serde::{Deserialize, Serialize};

/// Profile projection of the signed-in user. Persisted in client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupDetails {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Fields to change on the profile; absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Successful reply to login, signup and profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthReply {
    pub identity: Identity,
    /// Confirmation text from the service, if it sent one
    pub message: Option<String>,
}
