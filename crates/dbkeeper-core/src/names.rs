//! Validated name types for accounts and databases.
//!
//! # Macro-based name types
//!
//! The `name_type!` macro generates a string newtype whose only constructor runs a
//! validation function, so every `AccountName` or `LocalDbName` in the system is
//! known to be safe to embed in a live-engine identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Maximum length of an account name or a local database name.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum length of a composite database name (the live engine's identifier limit).
pub const MAX_DATABASE_NAME_LEN: usize = 64;

/// Separator between owner and local name in a composite database name.
const COMPOSITE_SEPARATOR: char = '+';

macro_rules! name_type {
    ($name:ident, $validate:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Borrow the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $validate(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(
    AccountName,
    validate_account_name,
    "A short account name, shared by the metadata store and the live engine.\n\nLowercase ASCII letters, digits, `_` and `-`, starting with a letter."
);
name_type!(
    LocalDbName,
    validate_local_db_name,
    "The owner-local part of a database name, as typed by the user."
);

fn validate_account_name(name: &str) -> Result<(), DomainError> {
    let reject = |reason| DomainError::InvalidAccountName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(reject("must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(reject("too long"));
    }
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(reject("must start with a lowercase letter"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(reject("only lowercase letters, digits, '_' and '-' are allowed"));
    }
    Ok(())
}

fn validate_local_db_name(name: &str) -> Result<(), DomainError> {
    let reject = |reason| DomainError::InvalidDatabaseName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(reject("must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(reject("too long"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(reject("only lowercase letters, digits, '_' and '-' are allowed"));
    }
    Ok(())
}

/// A globally unique composite database name, `<owner>+<local>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName {
    full: String,
    split: usize,
}

impl DatabaseName {
    /// Compose the full name from an owner and a local name.
    ///
    /// # Errors
    ///
    /// Returns an error if the composite exceeds [`MAX_DATABASE_NAME_LEN`].
    pub fn compose(owner: &AccountName, local: &LocalDbName) -> Result<Self, DomainError> {
        let full = format!("{owner}{COMPOSITE_SEPARATOR}{local}");
        if full.len() > MAX_DATABASE_NAME_LEN {
            return Err(DomainError::InvalidDatabaseName {
                name: local.to_string(),
                reason: "owner and database name together are too long",
            });
        }
        Ok(Self {
            split: owner.as_str().len(),
            full,
        })
    }

    /// The full composite name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The owner part of the name.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.full[..self.split]
    }

    /// The local part of the name.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.full[self.split + 1..]
    }
}

impl FromStr for DatabaseName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, local) =
            s.split_once(COMPOSITE_SEPARATOR)
                .ok_or_else(|| DomainError::InvalidDatabaseName {
                    name: s.to_string(),
                    reason: "missing owner separator",
                })?;
        Self::compose(&owner.parse()?, &local.parse()?)
    }
}

impl fmt::Debug for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatabaseName({})", self.full)
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.full
    }
}
