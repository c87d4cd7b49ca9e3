//! Directory lookups for new accounts.
//!
//! The directory maps a short account name to a display name and a contact
//! address. Lookups never fail the caller: anything that goes wrong yields an
//! empty entry and a log line.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use dbkeeper_core::AccountName;

/// A resolved directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Contact address.
    #[serde(default)]
    pub contact: String,
}

impl DirectoryEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(display_name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            contact: contact.into(),
        }
    }
}

/// Resolves account names to directory entries.
#[async_trait]
pub trait DirectoryResolver: Send + Sync {
    /// Look up `name`. Returns an empty entry if it is unknown or the lookup fails.
    async fn resolve(&self, name: &AccountName) -> DirectoryEntry;
}

/// Resolver that knows nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDirectory;

#[async_trait]
impl DirectoryResolver for NullDirectory {
    async fn resolve(&self, _name: &AccountName) -> DirectoryEntry {
        DirectoryEntry::default()
    }
}

/// Resolver backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, entry: DirectoryEntry) -> Self {
        self.entries.insert(name.into(), entry);
        self
    }
}

#[async_trait]
impl DirectoryResolver for StaticDirectory {
    async fn resolve(&self, name: &AccountName) -> DirectoryEntry {
        self.entries.get(name.as_str()).cloned().unwrap_or_default()
    }
}

/// Resolver backed by an HTTP directory service.
///
/// Issues `GET {base_url}/people/{name}` and expects
/// `{"display_name": "...", "contact": "..."}`. A 404 means unknown.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    /// Create a resolver for `base_url` with a per-lookup timeout.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn lookup(&self, name: &AccountName) -> Result<DirectoryEntry, reqwest::Error> {
        let url = format!("{}/people/{name}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(name = %name, "Name not in directory");
            return Ok(DirectoryEntry::default());
        }

        response.error_for_status()?.json().await
    }
}

#[async_trait]
impl DirectoryResolver for HttpDirectory {
    async fn resolve(&self, name: &AccountName) -> DirectoryEntry {
        match self.lookup(name).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Directory lookup failed - continuing without");
                DirectoryEntry::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bob() -> AccountName {
        "bob".parse().unwrap()
    }

    #[tokio::test]
    async fn static_directory_returns_known_entries() {
        let directory =
            StaticDirectory::new().with_entry("bob", DirectoryEntry::new("Bob B", "bob@x.edu"));

        assert_eq!(
            directory.resolve(&bob()).await,
            DirectoryEntry::new("Bob B", "bob@x.edu")
        );
        assert_eq!(
            directory.resolve(&"carol".parse().unwrap()).await,
            DirectoryEntry::default()
        );
    }

    #[tokio::test]
    async fn http_directory_parses_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/bob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Bob B",
                "contact": "bob@x.edu"
            })))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), Duration::from_secs(1));
        assert_eq!(
            directory.resolve(&bob()).await,
            DirectoryEntry::new("Bob B", "bob@x.edu")
        );
    }

    #[tokio::test]
    async fn http_directory_unknown_name_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), Duration::from_secs(1));
        assert_eq!(directory.resolve(&bob()).await, DirectoryEntry::default());
    }

    #[tokio::test]
    async fn http_directory_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), Duration::from_secs(1));
        assert_eq!(directory.resolve(&bob()).await, DirectoryEntry::default());

        let unreachable = HttpDirectory::new("http://127.0.0.1:1", Duration::from_millis(200));
        assert_eq!(unreachable.resolve(&bob()).await, DirectoryEntry::default());
    }
}
