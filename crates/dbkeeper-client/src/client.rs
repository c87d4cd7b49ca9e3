//! dbkeeper HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::{
    CommandRequest, DatabaseCreatedResponse, DatabaseListResponse, Empty, ErrorEnvelope,
    IsAuthResponse, PasswordResponse, ProfileFields, ProfileResponse, WhoAmIResponse,
};

/// dbkeeper API client.
///
/// Every method takes an optional `target`; `None` acts on the caller's own
/// account.
#[derive(Debug, Clone)]
pub struct DbKeeperClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DbKeeperClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://dbkeeper:8080"`)
    /// * `token` - Bearer token identifying the caller
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        token: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Provision an account. The returned password cannot be retrieved again.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn account_create(&self, target: Option<&str>) -> Result<PasswordResponse, ClientError> {
        self.command("account/create", target, Vec::new()).await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn account_delete(&self, target: Option<&str>) -> Result<(), ClientError> {
        self.command::<Empty>("account/delete", target, Vec::new())
            .await
            .map(|_| ())
    }

    /// Describe the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn whoami(&self) -> Result<WhoAmIResponse, ClientError> {
        self.command("account/whoami", None, Vec::new()).await
    }

    /// Ask whether the caller may act on `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn is_auth(&self, target: &str) -> Result<bool, ClientError> {
        self.command::<IsAuthResponse>("account/is-auth", Some(target), Vec::new())
            .await
            .map(|r| r.result)
    }

    // ========================================================================
    // Password
    // ========================================================================

    /// Set a password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn password_set(&self, target: Option<&str>, password: &str) -> Result<(), ClientError> {
        self.command::<Empty>("password/set", target, vec![password.to_string()])
            .await
            .map(|_| ())
    }

    /// Generate, set, and return a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn password_generate(
        &self,
        target: Option<&str>,
    ) -> Result<PasswordResponse, ClientError> {
        self.command("password/generate", target, Vec::new()).await
    }

    // ========================================================================
    // Database
    // ========================================================================

    /// Create a database; `name` is the owner-local part.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn database_create(
        &self,
        target: Option<&str>,
        name: &str,
    ) -> Result<DatabaseCreatedResponse, ClientError> {
        self.command("database/create", target, vec![name.to_string()])
            .await
    }

    /// Drop a database; `name` is the owner-local part.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn database_drop(&self, target: Option<&str>, name: &str) -> Result<(), ClientError> {
        self.command::<Empty>("database/drop", target, vec![name.to_string()])
            .await
            .map(|_| ())
    }

    /// List enabled databases and the byte quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn database_list(
        &self,
        target: Option<&str>,
    ) -> Result<DatabaseListResponse, ClientError> {
        self.command("database/list", target, Vec::new()).await
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// Read a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn profile_get(&self, target: Option<&str>) -> Result<ProfileResponse, ClientError> {
        self.command("profile/get", target, Vec::new()).await
    }

    /// Update a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the command.
    pub async fn profile_set(
        &self,
        target: Option<&str>,
        fields: &ProfileFields,
    ) -> Result<(), ClientError> {
        let payload = serde_json::to_string(fields)?;
        self.command::<Empty>("profile/set", target, vec![payload])
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn command<T: DeserializeOwned>(
        &self,
        path: &str,
        target: Option<&str>,
        args: Vec<String>,
    ) -> Result<T, ClientError> {
        let url = format!("{}/v1/{path}", self.base_url);
        let request = CommandRequest {
            target: target.map(ToString::to_string),
            args,
        };

        tracing::debug!(url = %url, target = ?request.target, "Sending command");

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let http_status = response.status();

        if http_status.is_success() {
            return Ok(response.json().await?);
        }

        let Ok(envelope) = response.json::<ErrorEnvelope>().await else {
            return Err(ClientError::Command {
                status: 2,
                message: format!("HTTP {http_status}"),
                http_status: http_status.as_u16(),
            });
        };

        let message = envelope.error;
        Err(match http_status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthenticated { message },
            StatusCode::FORBIDDEN => ClientError::Unauthorized { message },
            StatusCode::NOT_FOUND => ClientError::NotFound { message },
            StatusCode::BAD_REQUEST => ClientError::InvalidArguments { message },
            StatusCode::CONFLICT => ClientError::AlreadyExists {
                message,
                location: envelope.location.unwrap_or_default(),
            },
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::QuotaExceeded { message },
            _ => ClientError::Command {
                status: envelope.status,
                message,
                http_status: http_status.as_u16(),
            },
        })
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DbKeeperClient {
        DbKeeperClient::new(server.uri(), "tok").unwrap()
    }

    #[test]
    fn client_creation_trims_base_url() {
        let client = DbKeeperClient::new("http://localhost:8080/", "tok").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn account_create_sends_bearer_and_decodes_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/account/create"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({ "args": [] })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "password": "Ab3!xyz(9Q", "status": 0 })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client.account_create(None).await.unwrap();
        assert_eq!(created.password, "Ab3!xyz(9Q");
    }

    #[tokio::test]
    async fn database_create_sends_target_and_argument() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/database/create"))
            .and(body_json(json!({ "target": "sql", "args": ["blog"] })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "db_name": "sql+blog", "status": 0 })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client.database_create(Some("sql"), "blog").await.unwrap();
        assert_eq!(created.db_name, "sql+blog");
    }

    #[tokio::test]
    async fn database_list_decodes_entries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/database/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quota": 1024,
                "databases": [{ "name": "alice+blog", "size": 12 }],
                "status": 0
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let listing = client.database_list(None).await.unwrap();
        assert_eq!(listing.quota, 1024);
        assert_eq!(listing.databases[0].name, "alice+blog");
    }

    #[tokio::test]
    async fn profile_set_serializes_only_given_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/profile/set"))
            .and(body_json(json!({ "args": [r#"{"fullname":"Bob B"}"#] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 0 })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let fields = ProfileFields {
            fullname: Some("Bob B".into()),
            email: None,
        };
        client.profile_set(None, &fields).await.unwrap();
    }

    #[tokio::test]
    async fn already_exists_carries_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "database alice+blog could not be created",
                "status": 1,
                "where": "sql"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.database_create(None, "blog").await.unwrap_err();
        assert!(err.is_user_error());
        assert!(matches!(err, ClientError::AlreadyExists { ref location, .. } if location == "sql"));
    }

    #[tokio::test]
    async fn errors_map_by_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/account/delete"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": "alice is not authorized to act on bob",
                "status": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/database/list"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "database error: io",
                "status": 2
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let err = client.account_delete(Some("bob")).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { .. }));

        let err = client.database_list(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Command { status: 2, http_status: 500, .. }));
        assert!(!err.is_user_error());
    }

    #[tokio::test]
    async fn non_json_error_body_is_handled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.whoami().await.unwrap_err();
        assert!(matches!(err, ClientError::Command { http_status: 502, .. }));
    }
}
