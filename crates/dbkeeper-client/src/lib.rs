//! dbkeeper Client SDK.
//!
//! This crate provides a typed client for the dbkeeper command service.
//!
//! # Example
//!
//! ```no_run
//! use dbkeeper_client::DbKeeperClient;
//!
//! # async fn example() -> Result<(), dbkeeper_client::ClientError> {
//! let client = DbKeeperClient::new("http://dbkeeper:8080", "bearer-token")?;
//!
//! // Provision your own account; the password is only returned once.
//! let created = client.account_create(None).await?;
//! println!("password: {}", created.password);
//!
//! let db = client.database_create(None, "blog").await?;
//! println!("created {}", db.db_name);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, DbKeeperClient};
pub use error::ClientError;
pub use types::*;
