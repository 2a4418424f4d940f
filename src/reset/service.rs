use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::password;
use crate::auth::session::{Session, SessionRegistry};
use crate::auth::user::{is_valid_email, normalize_email, User};
use crate::error::AuthError;
use crate::mailer::Mailer;
use crate::reset::ticket::{mint_token, ResetTicket, RESET_TOKEN_TTL};
use crate::store::CredentialStore;

/// Drives the password-reset sequence: issue a token, validate it, collect
/// the replacement password, commit and log the user back in. Every step is
/// side-effect-free until its final store call, so a failed attempt never
/// leaves a half-reset account behind.
#[derive(Clone)]
pub struct ResetService {
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn Mailer>,
    sessions: Arc<SessionRegistry>,
    link_base: String,
}

impl ResetService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
        sessions: Arc<SessionRegistry>,
        link_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            mailer,
            sessions,
            link_base: link_base.into(),
        }
    }

    /// Mints a reset token for the account behind `email`, persists it with
    /// its one-hour deadline, and asks the mailer to deliver the link.
    ///
    /// The returned ticket carries everything the caller needs to build its
    /// own delivery payload; this service never renders a page or an email
    /// body. A mailer refusal surfaces as `Delivery`; the token is already
    /// persisted at that point and simply ages out.
    pub async fn issue_reset_token(&self, email: &str) -> Result<ResetTicket, AuthError> {
        let email = normalize_email(email);
        let user = if is_valid_email(&email) {
            self.store
                .find_by_email(&email)
                .await
                .map_err(AuthError::storage)?
        } else {
            None
        };
        let mut user = match user {
            Some(user) => user,
            None => {
                warn!("reset requested for unknown email");
                return Err(AuthError::UnknownAccount);
            }
        };

        let token = mint_token();
        let expires_at = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
        self.store
            .store_reset_token(user.id, &token, expires_at)
            .await
            .map_err(AuthError::storage)?;
        user.begin_reset(token.clone(), expires_at);

        let reset_link = format!("{}/{}", self.link_base.trim_end_matches('/'), token);
        self.mailer
            .send_reset_email(&user, &reset_link)
            .await
            .map_err(AuthError::delivery)?;

        info!(user_id = %user.id, "reset token issued");
        Ok(ResetTicket {
            token,
            expires_at,
            user,
        })
    }

    /// Finds the account holding a live (unconsumed, unexpired) copy of
    /// `token`. Wrong token and expired token are the same failure; a
    /// caller learns nothing about which part of the guess was off.
    pub async fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        let now = OffsetDateTime::now_utc();
        self.store
            .find_by_live_reset_token(token, now)
            .await
            .map_err(AuthError::storage)?
            .ok_or(AuthError::ResetTokenInvalid)
    }

    /// Plain equality of the password and its confirmation.
    pub fn confirm_passwords_match(password: &str, confirmation: &str) -> bool {
        password == confirmation
    }

    /// Commits a reset: re-validates the token at the moment of commit,
    /// checks the confirmation, installs the freshly salted hash while
    /// clearing the token, then logs the user straight in.
    ///
    /// The store commit is conditional on the token still being live, so of
    /// two racing completions exactly one wins; the loser sees
    /// `ResetTokenInvalid` and no state of its own applied.
    pub async fn complete_reset(
        &self,
        token: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<Session, AuthError> {
        let user = self.validate_token(token).await?;

        if !Self::confirm_passwords_match(new_password, confirmation) {
            return Err(AuthError::PasswordMismatch);
        }

        let credential_hash = password::hash(new_password).map_err(AuthError::storage)?;
        let now = OffsetDateTime::now_utc();
        let committed = self
            .store
            .commit_credential_reset(user.id, token, &credential_hash, now)
            .await
            .map_err(AuthError::storage)?;
        if !committed {
            warn!(user_id = %user.id, "reset token consumed or expired before commit");
            return Err(AuthError::ResetTokenInvalid);
        }

        // direct grant: the reset itself proved control of the account, so
        // this must not re-run credential verification
        let session = self.sessions.create(user.id);
        info!(user_id = %user.id, "password reset completed, user logged in");
        Ok(session)
    }
}
