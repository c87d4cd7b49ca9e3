//! SQL statement text for the MySQL adapter.
//!
//! Account and database names are validated before they get here, but every
//! value is still quoted: identifiers with backticks, everything else as a
//! string literal. Passwords supplied by users can contain anything.

use dbkeeper_core::{AccountName, DatabaseName};

/// Quote an identifier with backticks, doubling embedded backticks.
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Run on every new connection. Clears `NO_BACKSLASH_ESCAPES` from the session
/// `sql_mode`, which [`quote_literal`] relies on.
pub const SESSION_SETUP: &str = "SET SESSION sql_mode = TRIM(BOTH ',' FROM \
     REPLACE(CONCAT(',', @@SESSION.sql_mode, ','), ',NO_BACKSLASH_ESCAPES,', ','))";

/// Quote a string literal, escaping backslashes and single quotes.
///
/// Only valid on sessions without `NO_BACKSLASH_ESCAPES`; see [`SESSION_SETUP`].
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

fn account(name: &AccountName, host: &str) -> String {
    format!("{}@{}", quote_literal(name.as_str()), quote_literal(host))
}

/// `CREATE USER`
#[must_use]
pub fn create_account(name: &AccountName, host: &str, password: &str) -> String {
    format!(
        "CREATE USER {} IDENTIFIED BY {}",
        account(name, host),
        quote_literal(password)
    )
}

/// `DROP USER IF EXISTS`
#[must_use]
pub fn drop_account(name: &AccountName, host: &str) -> String {
    format!("DROP USER IF EXISTS {}", account(name, host))
}

/// `ALTER USER ... IDENTIFIED BY`
#[must_use]
pub fn change_password(name: &AccountName, host: &str, password: &str) -> String {
    format!(
        "ALTER USER {} IDENTIFIED BY {}",
        account(name, host),
        quote_literal(password)
    )
}

/// `CREATE DATABASE`
#[must_use]
pub fn create_database(database: &DatabaseName) -> String {
    format!("CREATE DATABASE {}", quote_identifier(database.as_str()))
}

/// `DROP DATABASE`, optionally `IF EXISTS`.
#[must_use]
pub fn drop_database(database: &DatabaseName, ignore_missing: bool) -> String {
    let if_exists = if ignore_missing { "IF EXISTS " } else { "" };
    format!(
        "DROP DATABASE {if_exists}{}",
        quote_identifier(database.as_str())
    )
}

/// `GRANT ALL PRIVILEGES ON db.* TO`
#[must_use]
pub fn grant(database: &DatabaseName, name: &AccountName, host: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON {}.* TO {}",
        quote_identifier(database.as_str()),
        account(name, host)
    )
}

/// `REVOKE ALL PRIVILEGES ON db.* FROM`
#[must_use]
pub fn revoke(database: &DatabaseName, name: &AccountName, host: &str) -> String {
    format!(
        "REVOKE ALL PRIVILEGES ON {}.* FROM {}",
        quote_identifier(database.as_str()),
        account(name, host)
    )
}
