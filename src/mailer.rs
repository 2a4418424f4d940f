use axum::async_trait;

use crate::auth::user::User;

/// Delivery boundary for reset emails. Implementations live with the
/// serving application (SMTP, a queue, a provider API); this crate only
/// asks for the hand-off and treats a refusal as a delivery failure the
/// caller of `issue_reset_token` must see.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_email(&self, user: &User, reset_link: &str) -> anyhow::Result<()>;
}
