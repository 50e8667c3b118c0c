//! User persistence: in-memory map for local runs, `PostgreSQL` otherwise.

use anyhow::{Context, Result};
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::utils::is_unique_violation;

pub const DEFAULT_ROLE: &str = "user";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    reset_token_hash: Option<Vec<u8>>,
    reset_token_expires_at: Option<i64>,
}

/// Fields required to create a user; `email` must already be normalized.
#[derive(Debug)]
pub(super) struct NewUser<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) password_hash: &'a str,
    pub(super) role: &'a str,
}

#[derive(Debug)]
pub(super) enum InsertOutcome {
    Created(UserRecord),
    Conflict,
}

#[derive(Debug)]
pub enum UserStore {
    Memory(RwLock<HashMap<Uuid, UserRecord>>),
    Postgres(PgPool),
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, reset_token_hash, reset_token_expires_at";

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        reset_token_hash: row.get("reset_token_hash"),
        reset_token_expires_at: row.get("reset_token_expires_at"),
    }
}

impl UserStore {
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(RwLock::new(HashMap::new()))
    }

    #[must_use]
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgresql",
        }
    }

    /// Check the backend is reachable.
    ///
    /// # Errors
    /// Returns an error if a database connection cannot be acquired or pinged.
    pub async fn ping(&self) -> Result<()> {
        let Self::Postgres(pool) = self else {
            return Ok(());
        };
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }

    pub(super) async fn insert(&self, user: NewUser<'_>) -> Result<InsertOutcome> {
        match self {
            Self::Memory(users) => {
                let mut users = users.write().await;
                if users.values().any(|existing| existing.email == user.email) {
                    return Ok(InsertOutcome::Conflict);
                }
                let record = UserRecord {
                    id: Uuid::new_v4(),
                    name: user.name.to_string(),
                    email: user.email.to_string(),
                    password_hash: user.password_hash.to_string(),
                    role: user.role.to_string(),
                    reset_token_hash: None,
                    reset_token_expires_at: None,
                };
                users.insert(record.id, record.clone());
                Ok(InsertOutcome::Created(record))
            }
            Self::Postgres(pool) => {
                let query = r"
                    INSERT INTO users (id, name, email, password_hash, role)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, name, email, password_hash, role, reset_token_hash, reset_token_expires_at
                ";
                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "INSERT",
                    db.statement = query
                );
                let row = sqlx::query(query)
                    .bind(Uuid::new_v4())
                    .bind(user.name)
                    .bind(user.email)
                    .bind(user.password_hash)
                    .bind(user.role)
                    .fetch_one(pool)
                    .instrument(span)
                    .await;
                match row {
                    Ok(row) => Ok(InsertOutcome::Created(user_from_row(&row))),
                    Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
                    Err(err) => Err(err).context("failed to insert user"),
                }
            }
        }
    }

    pub(super) async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        match self {
            Self::Memory(users) => Ok(users
                .read()
                .await
                .values()
                .find(|user| user.email == email)
                .cloned()),
            Self::Postgres(pool) => {
                let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "SELECT",
                    db.statement = query.as_str()
                );
                let row = sqlx::query(&query)
                    .bind(email)
                    .fetch_optional(pool)
                    .instrument(span)
                    .await
                    .context("failed to lookup user by email")?;
                Ok(row.as_ref().map(user_from_row))
            }
        }
    }

    pub(super) async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        match self {
            Self::Memory(users) => Ok(users.read().await.get(&id).cloned()),
            Self::Postgres(pool) => {
                let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "SELECT",
                    db.statement = query.as_str()
                );
                let row = sqlx::query(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .instrument(span)
                    .await
                    .context("failed to lookup user by id")?;
                Ok(row.as_ref().map(user_from_row))
            }
        }
    }

    /// Replace any pending reset token for `user_id`.
    pub(super) async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: Vec<u8>,
        expires_at: i64,
    ) -> Result<()> {
        match self {
            Self::Memory(users) => {
                let mut users = users.write().await;
                let user = users.get_mut(&user_id).context("user not found")?;
                user.reset_token_hash = Some(token_hash);
                user.reset_token_expires_at = Some(expires_at);
                Ok(())
            }
            Self::Postgres(pool) => {
                let query = r"
                    UPDATE users
                    SET reset_token_hash = $2, reset_token_expires_at = $3
                    WHERE id = $1
                ";
                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "UPDATE",
                    db.statement = query
                );
                sqlx::query(query)
                    .bind(user_id)
                    .bind(token_hash)
                    .bind(expires_at)
                    .execute(pool)
                    .instrument(span)
                    .await
                    .context("failed to store reset token")?;
                Ok(())
            }
        }
    }

    /// Swap the password of the user holding an unexpired reset token and
    /// clear the token. Returns `false` when no such user exists.
    pub(super) async fn consume_reset_token(
        &self,
        token_hash: &[u8],
        now: i64,
        password_hash: &str,
    ) -> Result<bool> {
        match self {
            Self::Memory(users) => {
                let mut users = users.write().await;
                let user = users.values_mut().find(|user| {
                    user.reset_token_hash.as_deref() == Some(token_hash)
                        && user.reset_token_expires_at.is_some_and(|exp| exp > now)
                });
                Ok(user.map_or(false, |user| {
                    user.password_hash = password_hash.to_string();
                    user.reset_token_hash = None;
                    user.reset_token_expires_at = None;
                    true
                }))
            }
            Self::Postgres(pool) => {
                let query = r"
                    UPDATE users
                    SET password_hash = $3, reset_token_hash = NULL, reset_token_expires_at = NULL
                    WHERE reset_token_hash = $1 AND reset_token_expires_at > $2
                ";
                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "UPDATE",
                    db.statement = query
                );
                let result = sqlx::query(query)
                    .bind(token_hash)
                    .bind(now)
                    .bind(password_hash)
                    .execute(pool)
                    .instrument(span)
                    .await
                    .context("failed to consume reset token")?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}
