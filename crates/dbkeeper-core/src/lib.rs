//! Core types for dbkeeper.
//!
//! This crate provides the foundational types used throughout dbkeeper:
//!
//! - **Names**: `AccountName`, `LocalDbName`, `DatabaseName`
//! - **Accounts**: `Account`, `Quota`, `UsageStat`, `Profile`
//! - **Databases**: `Database`, `DatabaseQuota`
//! - **Access**: `AccessPolicy`, the authorization gate every command passes first
//! - **Credentials**: random credential generation
//!
//! # Composite database names
//!
//! A database owned by `alice` with the local name `blog` is provisioned as
//! `alice+blog`. The composite is what the metadata store and the live engine
//! both key on, so two owners can pick the same local name without colliding.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod account;
pub mod credential;
pub mod database;
pub mod error;
pub mod names;

pub use access::{AccessPolicy, DEFAULT_PRIVILEGED_TARGETS};
pub use account::{
    Account, Profile, ProfileUpdate, Quota, UsageStat, DEFAULT_MAX_BYTES, DEFAULT_MAX_DATABASES,
};
pub use credential::{generate_password, DEFAULT_PASSWORD_LENGTH, PASSWORD_ALPHABET};
pub use database::{Database, DatabaseQuota};
pub use error::{DomainError, Result};
pub use names::{AccountName, DatabaseName, LocalDbName, MAX_DATABASE_NAME_LEN, MAX_NAME_LEN};
