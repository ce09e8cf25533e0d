//! SQLite-backed credential store.
//!
//! One table, `users`, holding at most one row: the current Spotify
//! access/refresh token pair and its expiry (Unix seconds).

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::error::AppError;
use crate::providers::TokenSet;

/// Durable home of the single credential record.
///
/// `save` replaces everything, `load` returns the one record (if any) and
/// `clear` is idempotent.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(&self, credential: &Credential) -> Result<(), AppError>;
    async fn load(&self) -> Result<Option<Credential>, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

/// Credential store backed by a local SQLite file.
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub async fn connect(db_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open SQLite database: {e}")))?;

        Ok(Self { pool })
    }

    /// Create the table if absent. There are no further migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                spotify_access     TEXT,
                spotify_refresh    TEXT,
                spotify_expires_at INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of stored rows. Only useful for checking the one-row invariant.
    pub async fn row_count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save(&self, credential: &Credential) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;

        sqlx::query(
            r#"
            INSERT INTO users (spotify_access, spotify_refresh, spotify_expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT spotify_access, spotify_refresh, spotify_expires_at
            FROM users
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let access_token: Option<String> = row.try_get(0)?;
        let refresh_token: Option<String> = row.try_get(1)?;
        let expires_at: Option<i64> = row.try_get(2)?;

        Ok(Some(Credential {
            access_token: access_token.unwrap_or_default(),
            refresh_token: refresh_token.unwrap_or_default(),
            expires_at: expires_at.unwrap_or_default(),
        }))
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

/// Spotify access tokens live one hour when the response omits `expires_in`.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

// ── Types ────────────────────────────────────────────────────────────────────

/// The cached Spotify token triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, Unix seconds.
    pub expires_at: i64,
}

impl Credential {
    /// Build a credential from a token endpoint response received at `now`.
    ///
    /// Spotify may omit the refresh token on a refresh grant, in which case the
    /// previous one stays valid.
    pub fn from_token_set(tokens: TokenSet, now: i64, previous_refresh: Option<&str>) -> Self {
        let refresh_token = tokens
            .refresh_token
            .filter(|rt| !rt.is_empty())
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default();

        let lifetime = tokens
            .expires_in
            .map_or(DEFAULT_LIFETIME_SECS, |secs| i64::try_from(secs).unwrap_or(i64::MAX));

        Credential {
            access_token: tokens.access_token,
            refresh_token,
            expires_at: now.saturating_add(lifetime),
        }
    }

    /// True once `now + skew_secs` has reached the expiry.
    pub fn is_expired_at(&self, now: i64, skew_secs: i64) -> bool {
        now + skew_secs >= self.expires_at
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}
