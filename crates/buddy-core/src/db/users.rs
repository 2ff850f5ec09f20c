//! User account operations

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Create a new user with an Argon2id-hashed password
    ///
    /// Also creates the user's default monthly budget so the dashboard has
    /// something to show immediately. Duplicate usernames or emails surface
    /// as `Error::Conflict`.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "username, email and password are required".to_string(),
            ));
        }

        let conn = self.conn()?;

        // Friendly pre-check; the UNIQUE constraints are the backstop
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ? OR email = ?",
                params![username, email],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            warn!(username, "Registration attempt with existing username or email");
            return Err(Error::Conflict(
                "username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;

        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
            params![username, email, password_hash],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Conflict("username or email already exists".to_string())
            }
            other => Error::Database(other),
        })?;
        let user_id = conn.last_insert_rowid();

        // Seed the default budget in the same logical step as registration
        conn.execute(
            "INSERT INTO budgets (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING",
            params![user_id],
        )?;

        info!(username, user_id, "User created");

        self.get_user(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }

    /// Look up a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE id = ?",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE username = ?",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// Returns the user on success, `None` for an unknown username or a
    /// wrong password; the caller cannot tell which.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn()?;

        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?",
                params![username.trim()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((id, stored_hash)) = row else {
            return Ok(None);
        };

        if verify_password(password, &stored_hash)? {
            self.get_user(id)
        } else {
            warn!(username, "Failed login attempt");
            Ok(None)
        }
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

/// Hash a password with Argon2id and a random salt, producing a PHC string
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string
fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
