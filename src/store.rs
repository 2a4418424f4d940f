use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::user::User;

/// Persistence boundary for user credentials. Injected into the services as
/// `Arc<dyn CredentialStore>`; nothing in this crate reaches for a global
/// connection.
///
/// `commit_credential_reset` is the one write that must be atomic per row:
/// it applies the new hash and clears the reset pair only while the stored
/// token still equals the presented one and is unexpired. Two racing
/// completions therefore resolve to one winner at this boundary.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Looks up the user holding `token` with a deadline strictly after
    /// `now`. Expired tokens match nothing.
    async fn find_by_live_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>>;

    /// Persists a pending reset token and its deadline as a pair.
    async fn store_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;

    /// Conditionally installs a new credential hash and clears the reset
    /// pair. Returns `false` when the condition no longer holds: the token
    /// was already consumed, replaced or expired.
    async fn commit_credential_reset(
        &self,
        id: Uuid,
        token: &str,
        credential_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;
}

/// Production store over Postgres.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, credential_hash, reset_token, reset_expires_at, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, credential_hash, reset_token, reset_expires_at, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_live_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, credential_hash, reset_token, reset_expires_at, created_at
            FROM users
            WHERE reset_token = $1 AND reset_expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("find user by reset token")?;
        Ok(user)
    }

    async fn store_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .context("store reset token")?;
        Ok(())
    }

    async fn commit_credential_reset(
        &self,
        id: Uuid,
        token: &str,
        credential_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        // single conditional UPDATE: the row-level lock makes concurrent
        // completions of the same token resolve to exactly one winner
        let result = sqlx::query(
            r#"
            UPDATE users
            SET credential_hash = $3, reset_token = NULL, reset_expires_at = NULL
            WHERE id = $1 AND reset_token = $2 AND reset_expires_at > $4
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(credential_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("commit credential reset")?;
        Ok(result.rows_affected() == 1)
    }
}

/// In-memory store. Backs the test suites and single-process deployments;
/// a mutex over the whole map gives it the same per-row atomicity the
/// Postgres conditional UPDATE provides.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user record directly. Registration is not this subsystem's
    /// job, so seeding stands in for it.
    pub fn seed(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }

    async fn find_by_live_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token) && u.has_live_reset(now))
            .cloned())
    }

    async fn store_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .with_context(|| format!("no user {id}"))?;
        user.begin_reset(token.to_string(), expires_at);
        Ok(())
    }

    async fn commit_credential_reset(
        &self,
        id: Uuid,
        token: &str,
        credential_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .with_context(|| format!("no user {id}"))?;
        if user.reset_token.as_deref() != Some(token) || !user.has_live_reset(now) {
            return Ok(false);
        }
        user.credential_hash = credential_hash.to_string();
        user.clear_reset();
        Ok(true)
    }
}
