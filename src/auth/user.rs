use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Canonical form used for every lookup: login identifiers are
/// case-insensitive and surrounding whitespace is ignored.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                                  // unique user ID
    pub email: String,                             // login identifier, stored lowercased
    pub name: String,                              // display name
    #[serde(skip_serializing)]
    pub credential_hash: String,                   // Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,               // pending reset token, if any
    #[serde(skip_serializing)]
    pub reset_expires_at: Option<OffsetDateTime>,  // set and cleared together with reset_token
    pub created_at: OffsetDateTime,
}

impl User {
    /// Attaches a pending reset token. The token and its deadline travel as
    /// a pair; this and [`clear_reset`](Self::clear_reset) are the only
    /// mutators of the two fields.
    pub fn begin_reset(&mut self, token: String, expires_at: OffsetDateTime) {
        self.reset_token = Some(token);
        self.reset_expires_at = Some(expires_at);
    }

    pub fn clear_reset(&mut self) {
        self.reset_token = None;
        self.reset_expires_at = None;
    }

    /// True while a reset token is attached and its deadline has not passed.
    /// A token exactly at its deadline is already dead.
    pub fn has_live_reset(&self, now: OffsetDateTime) -> bool {
        match (&self.reset_token, self.reset_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }
}
