//! Single-operator login.
//!
//! Passwords are stored as argon2 PHC strings. Rows written by older
//! installs may hold a plaintext password; a successful login against one
//! rewrites it as a hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rusqlite::{params, OptionalExtension};

use crate::db::{name_taken, Vault};
use crate::error::{Result, VaultError};
use crate::paths::required;

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

const HASH_PREFIX: &str = "$argon2";

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| VaultError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(HASH_PREFIX)
}

/// Compare `candidate` against a stored value, hashed or legacy plaintext.
pub fn verify_password(stored: &str, candidate: &str) -> Result<bool> {
    if !is_hashed(stored) {
        return Ok(stored == candidate);
    }
    let parsed = PasswordHash::new(stored).map_err(|e| VaultError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

struct UserRow {
    id: i64,
    password: String,
}

impl Vault {
    fn find_user(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, password FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        password: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    /// Create the default operator account when no user exists. Returns
    /// whether one was created.
    pub fn ensure_default_user(&mut self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        if count > 0 {
            return Ok(false);
        }
        let hash = hash_password(DEFAULT_PASSWORD)?;
        self.conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![DEFAULT_USERNAME, hash],
        )?;
        tracing::info!(username = DEFAULT_USERNAME, "default user created");
        Ok(true)
    }

    /// Check credentials. A legacy plaintext password that matches is
    /// replaced by its hash.
    pub fn verify_login(&mut self, username: &str, password: &str) -> Result<bool> {
        let Some(user) = self.find_user(username)? else {
            return Ok(false);
        };
        if !verify_password(&user.password, password)? {
            return Ok(false);
        }
        if !is_hashed(&user.password) {
            let hash = hash_password(password)?;
            self.conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                params![hash, user.id],
            )?;
            tracing::info!(username, "legacy password upgraded to hash");
        }
        Ok(true)
    }

    /// Change username and/or password after re-checking the current
    /// password. Returns the username now in effect.
    pub fn update_profile(
        &mut self,
        username: &str,
        current_password: &str,
        new_username: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<String> {
        if current_password.is_empty() {
            return Err(VaultError::validation("current password is required"));
        }
        let new_username = new_username.map(str::trim).filter(|s| !s.is_empty());
        let new_password = new_password.filter(|s| !s.is_empty());
        if new_username.is_none() && new_password.is_none() {
            return Err(VaultError::validation(
                "a new username or a new password is required",
            ));
        }

        let user = self
            .find_user(username)?
            .ok_or(VaultError::InvalidCredentials)?;
        if !verify_password(&user.password, current_password)? {
            return Err(VaultError::InvalidCredentials);
        }

        let effective = match new_username {
            Some(name) => {
                let name = required("username", name)?;
                if name_taken(&self.conn, "users", "username", name, Some(user.id))? {
                    return Err(VaultError::duplicate("user", name));
                }
                name.to_string()
            }
            None => username.to_string(),
        };
        let password = match new_password {
            Some(pw) => hash_password(pw)?,
            None if is_hashed(&user.password) => user.password,
            None => hash_password(current_password)?,
        };

        self.conn.execute(
            "UPDATE users SET username = ?1, password = ?2 WHERE id = ?3",
            params![effective, password, user.id],
        )?;
        tracing::info!(username = %effective, "profile updated");
        Ok(effective)
    }
}
