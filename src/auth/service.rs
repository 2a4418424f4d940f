use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::password;
use crate::auth::session::{Session, SessionRegistry};
use crate::auth::user::{is_valid_email, normalize_email, User};
use crate::error::AuthError;
use crate::store::CredentialStore;

/// Verifies credentials and owns the session lifecycle. All collaborators
/// are injected; the authenticator never creates or edits user records
/// beyond the credential itself.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<SessionRegistry>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, sessions: Arc<SessionRegistry>) -> Self {
        Self { store, sessions }
    }

    /// Checks an email/password pair and opens a session on a match.
    ///
    /// Unknown email, malformed email and wrong password all come back as
    /// the same `InvalidCredentials`, so a caller cannot probe which
    /// accounts exist.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            warn!("login with malformed email");
            return Err(AuthError::InvalidCredentials);
        }

        let user = match self
            .store
            .find_by_email(&email)
            .await
            .map_err(AuthError::storage)?
        {
            Some(user) => user,
            None => {
                warn!(email = %email, "login for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = password::verify(password, &user.credential_hash).map_err(AuthError::storage)?;
        if !ok {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.sessions.create(user.id);
        info!(user_id = %user.id, "user logged in");
        Ok(session)
    }

    /// Ends a session. Logging out an already-dead session is fine.
    pub fn logout(&self, session_token: &str) {
        self.sessions.revoke(session_token);
    }

    /// Resolves a session token back to its user, or `NotAuthenticated` if
    /// the session is missing, expired or revoked (or its user vanished
    /// underneath it).
    pub async fn require_authenticated(&self, session_token: &str) -> Result<User, AuthError> {
        let user_id = self
            .sessions
            .resolve(session_token)
            .ok_or(AuthError::NotAuthenticated)?;
        self.store
            .find_by_id(user_id)
            .await
            .map_err(AuthError::storage)?
            .ok_or(AuthError::NotAuthenticated)
    }
}
