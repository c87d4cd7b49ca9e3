//! dbkeeper HTTP command service.
//!
//! This crate provides the provisioning coordinator and the HTTP surface in
//! front of it:
//!
//! - Account create/delete, identity lookup, and authorization checks
//! - Database create/drop/list with quotas
//! - Password set/generate
//! - Profile get/set
//!
//! # Consistency
//!
//! Commands write the metadata store first and the live engine second. The
//! metadata store decides whether an account or database exists. A live-engine
//! failure while creating a database is compensated by deleting the metadata
//! rows again; live-engine failures in account create/delete, database drop,
//! and password set are logged at `warn` and need manual reconciliation.
//!
//! # Authentication
//!
//! Callers present an HS256 bearer token whose subject is their principal.
//! The account name is the principal up to the first `@`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Commands all return Result
#![allow(clippy::unused_async)] // Handlers need async for axum

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod provision;
pub mod routes;
pub mod state;

pub use auth::Actor;
pub use config::ServiceConfig;
pub use directory::{DirectoryEntry, DirectoryResolver, HttpDirectory, NullDirectory, StaticDirectory};
pub use error::{CommandError, Envelope, Location, QuotaDimension};
pub use provision::{ProvisionSettings, Provisioner};
pub use routes::create_router;
pub use state::AppState;
