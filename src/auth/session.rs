use std::collections::HashMap;
use std::sync::RwLock;

use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::reset::ticket::mint_token;

/// Proof of authentication handed back to the caller. The token is an
/// opaque handle; presenting it to [`SessionRegistry::resolve`] is the only
/// way to get anything out of it.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
}

struct SessionEntry {
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

/// Server-side session table. Sessions are revocable: logout removes the
/// entry, so a token cannot outlive it the way a signed stateless token
/// would.
pub struct SessionRegistry {
    ttl: Duration,
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a session for a user and returns its handle.
    pub fn create(&self, user_id: Uuid) -> Session {
        let token = mint_token();
        let expires_at = OffsetDateTime::now_utc() + self.ttl;
        self.entries.write().unwrap().insert(
            token.clone(),
            SessionEntry {
                user_id,
                expires_at,
            },
        );
        debug!(user_id = %user_id, "session opened");
        Session {
            token,
            user_id,
            expires_at,
        }
    }

    /// Returns the user behind a token, or `None` for unknown, revoked and
    /// expired tokens. Expired entries are dropped on the way out.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let now = OffsetDateTime::now_utc();
        {
            let entries = self.entries.read().unwrap();
            match entries.get(token) {
                Some(entry) if entry.expires_at > now => return Some(entry.user_id),
                Some(_) => {}
                None => return None,
            }
        }
        // expired: evict under the write lock
        self.entries.write().unwrap().remove(token);
        None
    }

    /// Drops a session. Revoking an unknown or already-revoked token is a
    /// no-op, so callers can log out unconditionally.
    pub fn revoke(&self, token: &str) {
        if self.entries.write().unwrap().remove(token).is_some() {
            debug!("session revoked");
        }
    }

    /// Pushes a live session's deadline forward by one TTL and returns the
    /// new deadline. Whether and when to call this per request is the
    /// serving layer's policy, not ours.
    pub fn extend(&self, token: &str) -> Option<OffsetDateTime> {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.write().unwrap();
        let entry = entries.get_mut(token)?;
        if entry.expires_at <= now {
            return None;
        }
        entry.expires_at = now + self.ttl;
        Some(entry.expires_at)
    }
}
