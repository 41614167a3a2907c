//! Console accounts and admin sessions.
//!
//! Handles password hashing (argon2), session creation/validation, the
//! one-shot flash message carried on a session, and administrator bootstrap.

use crate::db::{self, DbPool};
use crate::sql;
use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Account role stored in `"user".role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Doctor,
    Nurse,
    Receptionist,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Doctor,
        Role::Nurse,
        Role::Receptionist,
        Role::Administrator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
            Role::Receptionist => "Receptionist",
            Role::Administrator => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Admin session record, joined with its account.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
    pub user_id: i64,
    pub username: String,
    /// Raw role text; the session guard decides what it allows.
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub flash_message: Option<String>,
}

/// Database-backed storage for console accounts and sessions.
pub struct SessionStore {
    pool: DbPool,
}

impl SessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure session ID.
    fn generate_session_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    /// Create an account with no role-detail row (Administrator/Receptionist).
    ///
    /// Returns the new user id.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> Result<i64> {
        let password_hash = hash_password(password)?;

        let row = sqlx::query(sql::INSERT_USER)
            .bind(username)
            .bind(&password_hash)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to create user {username}"))?;

        let user_id: i64 = row.get("user_id");
        info!(user_id, username, role = %role, "Created console user");
        Ok(user_id)
    }

    /// Authenticate an administrator and create a session.
    ///
    /// Returns the session ID on success. Unknown users, wrong passwords and
    /// accounts without the Administrator role all return `None`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        session_timeout_secs: u64,
    ) -> Result<Option<String>> {
        let row = sqlx::query(sql::SELECT_USER_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.get("password");
        if !verify_password(password, &password_hash) {
            return Ok(None);
        }

        let role: String = row.get("role");
        if role.parse::<Role>() != Ok(Role::Administrator) {
            debug!(username, role = %role, "Refusing console login for non-administrator");
            return Ok(None);
        }

        let user_id: i64 = row.get("user_id");
        let session_id = Self::generate_session_id();
        let now = Utc::now();
        let expires_at = i64::try_from(session_timeout_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| anyhow!("Session timeout out of range: {session_timeout_secs}s"))?;

        sqlx::query(sql::INSERT_ADMIN_SESSION)
            .bind(&session_id)
            .bind(user_id)
            .bind(db::format_timestamp(now))
            .bind(db::format_timestamp(expires_at))
            .execute(&self.pool)
            .await
            .context("Failed to create session")?;

        Ok(Some(session_id))
    }

    /// Validate a session and return it with its account.
    ///
    /// Expired sessions are deleted and reported as absent.
    pub async fn validate_session(&self, session_id: &str) -> Result<Option<AdminSession>> {
        let row = sqlx::query(sql::SELECT_ADMIN_SESSION)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at = db::parse_timestamp(row.get("expires_at"))?;
        if expires_at < Utc::now() {
            self.delete_session(session_id).await.ok();
            return Ok(None);
        }

        Ok(Some(AdminSession {
            session_id: row.get("session_id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            role: row.get("role"),
            created_at: db::parse_timestamp(row.get("created_at"))?,
            expires_at,
            flash_message: row.get("flash_message"),
        }))
    }

    /// Delete a session (logout).
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        sqlx::query(sql::DELETE_ADMIN_SESSION)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Delete all expired sessions.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query(sql::DELETE_EXPIRED_ADMIN_SESSIONS)
            .bind(db::format_timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected())
    }

    /// Stash a one-shot message shown on the next page render.
    pub async fn set_flash(&self, session_id: &str, message: &str) -> Result<()> {
        sqlx::query(sql::SET_SESSION_FLASH)
            .bind(message)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .context("Failed to store flash message")?;

        Ok(())
    }

    /// Drop the flash message once it has been rendered.
    pub async fn clear_flash(&self, session_id: &str) -> Result<()> {
        sqlx::query(sql::CLEAR_SESSION_FLASH)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear flash message")?;

        Ok(())
    }
}
