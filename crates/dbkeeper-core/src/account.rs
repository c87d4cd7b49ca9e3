//! Account types for dbkeeper.
//!
//! An account is created together with its quota and usage stat, and those two
//! records live exactly as long as the account does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::AccountName;

// ============================================================================
// Constants
// ============================================================================

/// Default maximum number of enabled databases per account.
pub const DEFAULT_MAX_DATABASES: u32 = 40;

/// Default maximum total bytes per account (100 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// A provisioned account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account name.
    pub name: AccountName,

    /// Human-readable name, from the directory or the profile.
    pub display_name: String,

    /// Contact address, from the directory or the profile.
    pub contact: String,

    /// When the credential last changed.
    pub credential_updated_at: DateTime<Utc>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record. The credential itself lives in the live engine.
    #[must_use]
    pub fn new(name: AccountName, display_name: String, contact: String) -> Self {
        let now = Utc::now();
        Self {
            name,
            display_name,
            contact,
            credential_updated_at: now,
            created_at: now,
        }
    }

    /// Record that the credential was changed.
    pub fn touch_credential(&mut self) {
        self.credential_updated_at = Utc::now();
    }

    /// The public profile view of this account.
    #[must_use]
    pub fn profile(&self) -> Profile {
        Profile {
            fullname: self.display_name.clone(),
            email: self.contact.clone(),
        }
    }

    /// Apply a profile update; absent fields are left unchanged.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(fullname) = update.fullname {
            self.display_name = fullname;
        }
        if let Some(email) = update.email {
            self.contact = email;
        }
    }
}

/// Per-account limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Maximum number of enabled databases.
    pub max_databases: u32,

    /// Maximum total bytes across all databases.
    pub max_bytes: u64,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            max_databases: DEFAULT_MAX_DATABASES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Current byte usage for an account, written by out-of-band accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStat {
    /// Bytes currently used across all databases.
    pub bytes: u64,

    /// When the stat was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl UsageStat {
    /// A zero-usage stat, as created alongside a new account.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bytes: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Profile view returned by `profile get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub fullname: String,
    /// Contact address.
    pub email: String,
}

/// A parsed `profile set` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name, if given.
    pub fullname: Option<String>,
    /// New contact address, if given.
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Parse a JSON object payload.
    ///
    /// Unrecognized keys are ignored. A recognized key must carry a string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProfile` if the payload is not JSON, not an
    /// object, or a recognized key holds a non-string value.
    pub fn parse(payload: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| DomainError::InvalidProfile(format!("not valid JSON: {e}")))?;
        let serde_json::Value::Object(map) = value else {
            return Err(DomainError::InvalidProfile("expected a JSON object".into()));
        };

        let field = |key: &str| -> Result<Option<String>, DomainError> {
            match map.get(key) {
                None => Ok(None),
                Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(DomainError::InvalidProfile(format!("{key} must be a string"))),
            }
        };

        Ok(Self {
            fullname: field("fullname")?,
            email: field("email")?,
        })
    }
}
