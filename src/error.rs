use thiserror::Error;

/// Error taxonomy for the authentication subsystem.
///
/// The first five variants are expected user-facing outcomes; the consuming
/// layer maps them to redirects or status codes. `Storage` and `Delivery`
/// are infrastructure faults surfaced as-is for generic handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately one variant for both.
    #[error("Failed Login")]
    InvalidCredentials,

    /// No live session backs the request.
    #[error("You must be logged in to do this")]
    NotAuthenticated,

    /// Password-reset request for an email with no account.
    #[error("No account with that email exists")]
    UnknownAccount,

    /// Wrong reset token, or the right token past its expiry. One variant.
    #[error("Password reset is invalid or has expired")]
    ResetTokenInvalid,

    /// New password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The mailer could not hand off the reset email.
    #[error("Failed to send the password reset email")]
    Delivery(#[source] anyhow::Error),

    /// Credential store backend unavailable or returned corrupt state.
    #[error("Credential store error")]
    Storage(#[source] anyhow::Error),
}

impl AuthError {
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }

    pub fn delivery(err: impl Into<anyhow::Error>) -> Self {
        Self::Delivery(err.into())
    }
}
