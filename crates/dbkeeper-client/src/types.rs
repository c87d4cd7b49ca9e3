//! Request and response types for the dbkeeper command API.

use serde::{Deserialize, Serialize};

/// Body of every command request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandRequest {
    /// Account to act on; the server defaults it to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Positional arguments.
    pub args: Vec<String>,
}

/// A credential, returned once by `account create` and `password generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResponse {
    /// The credential.
    pub password: String,
}

/// Response of `account whoami`.
#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmIResponse {
    /// Authenticated principal.
    pub principal: String,
    /// Account name.
    pub username: String,
    /// Whether the account is provisioned.
    pub exists: bool,
}

/// Response of `account is-auth`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IsAuthResponse {
    /// Gate decision.
    pub result: bool,
}

/// Response of `database create`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCreatedResponse {
    /// Composite `<owner>+<name>` database name.
    pub db_name: String,
}

/// One database in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseInfo {
    /// Composite name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Response of `database list`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseListResponse {
    /// Byte ceiling of the account.
    pub quota: u64,
    /// Enabled databases.
    pub databases: Vec<DatabaseInfo>,
}

/// Response of `profile get`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileResponse {
    /// Display name.
    pub fullname: String,
    /// Contact address.
    pub email: String,
}

/// Fields for `profile set`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileFields {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    /// New contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// Message.
    pub error: String,
    /// `1` for user errors, `2` for unexpected ones.
    pub status: u8,
    /// Where a collision happened, for `AlreadyExists`.
    #[serde(rename = "where", default)]
    pub location: Option<String>,
}

/// Empty success envelope.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Empty {}
