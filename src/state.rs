use std::sync::Arc;

use crate::auth::service::Authenticator;
use crate::auth::session::SessionRegistry;
use crate::config::AuthConfig;
use crate::mailer::Mailer;
use crate::reset::service::ResetService;
use crate::store::CredentialStore;

/// Wired-up subsystem: one session registry shared by login and reset, both
/// services bound to the same injected boundaries. The serving application
/// builds one of these at startup and hands the pieces to its routes.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Authenticator,
    pub resets: ResetService,
    pub sessions: Arc<SessionRegistry>,
}

impl AuthState {
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session_ttl()));
        let authenticator = Authenticator::new(store.clone(), sessions.clone());
        let resets = ResetService::new(
            store,
            mailer,
            sessions.clone(),
            config.reset_link_base.clone(),
        );
        Self {
            authenticator,
            resets,
            sessions,
        }
    }
}
