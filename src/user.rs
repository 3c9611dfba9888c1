//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Users are identified by the email address given to us by the identity
/// provider, we never see their credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, unique across all users.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if no user has the email address `email`,
/// - or [Error::SqlError] if there was some other SQL error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    find_user_by_email(email, connection)?.ok_or(Error::UserNotFound)
}

fn find_user_by_email(email: &str, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .prepare("SELECT id, email FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], |row| {
            Ok(User {
                id: UserId::new(row.get(0)?),
                email: row.get(1)?,
            })
        })
        .optional()
        .map_err(Error::from)
}

/// Get the user registered with `email`, registering them first if this is
/// the first time we have seen them.
///
/// Two requests for a new user may race to insert the same email. The unique
/// constraint on the email column lets only one insert through, and the loser
/// reads back the row the winner created.
///
/// # Errors
///
/// This function will return a:
/// - [Error::MissingIdentity] if `email` is blank,
/// - or [Error::SqlError] if there was an SQL error.
pub fn check_and_add_user(email: &str, connection: &Connection) -> Result<User, Error> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::MissingIdentity);
    }

    if let Some(user) = find_user_by_email(email, connection)? {
        tracing::debug!("user {} is already registered", user.id);
        return Ok(user);
    }

    insert_user(email, connection)
}

/// Insert a user with `email`, falling back to the existing row when another
/// request registered the same email first.
fn insert_user(email: &str, connection: &Connection) -> Result<User, Error> {
    match connection.execute("INSERT INTO user (email) VALUES (?1)", (email,)) {
        Ok(_) => {
            let user = User {
                id: UserId::new(connection.last_insert_rowid()),
                email: email.to_owned(),
            };
            tracing::info!("registered new user {}", user.id);

            Ok(user)
        }
        Err(rusqlite::Error::SqliteFailure(error, _))
            if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            tracing::warn!("user was registered by a concurrent request, using existing user");
            get_user_by_email(email, connection)
        }
        Err(error) => Err(error.into()),
    }
}
