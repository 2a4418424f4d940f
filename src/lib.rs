//! Credential authentication and password reset for the store platform.
//!
//! The serving application owns routing, rendering and delivery; this crate
//! owns credential verification, sessions, the authorization gate and the
//! reset-token lifecycle, against injected store and mailer boundaries.

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod reset;
pub mod state;
pub mod store;

pub use auth::gate::CurrentUser;
pub use auth::service::Authenticator;
pub use auth::session::{Session, SessionRegistry};
pub use auth::user::{normalize_email, User};
pub use config::AuthConfig;
pub use error::AuthError;
pub use mailer::Mailer;
pub use reset::service::ResetService;
pub use reset::ticket::{ResetTicket, RESET_TOKEN_TTL};
pub use state::AuthState;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
