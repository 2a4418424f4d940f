use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use crate::auth::service::Authenticator;
use crate::auth::user::User;

/// Authorization gate for protected routes. Resolves the bearer session
/// token and hands the handler the authenticated user; everything else is
/// rejected before the handler runs. Translating the rejection into a
/// redirect or challenge is the serving layer's business.
#[derive(Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Authenticator: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Authenticator::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        ))?;

        match auth.require_authenticated(token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(e) => {
                warn!("rejected unauthenticated request");
                Err((StatusCode::UNAUTHORIZED, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password;
    use crate::auth::session::SessionRegistry;
    use crate::store::MemoryCredentialStore;
    use axum::http::Request;
    use std::sync::Arc;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    #[derive(Clone)]
    struct TestState {
        auth: Authenticator,
    }

    impl FromRef<TestState> for Authenticator {
        fn from_ref(state: &TestState) -> Self {
            state.auth.clone()
        }
    }

    async fn state_with_user() -> (TestState, String) {
        let store = MemoryCredentialStore::new();
        store.seed(User {
            id: Uuid::new_v4(),
            email: "beck@downtown.example".into(),
            name: "Beck".into(),
            credential_hash: password::hash("on-tap").unwrap(),
            reset_token: None,
            reset_expires_at: None,
            created_at: OffsetDateTime::now_utc(),
        });
        let sessions = Arc::new(SessionRegistry::new(Duration::minutes(30)));
        let auth = Authenticator::new(Arc::new(store), sessions);
        let session = auth
            .authenticate("beck@downtown.example", "on-tap")
            .await
            .unwrap();
        (TestState { auth }, session.token)
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/stores/new");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn live_session_passes_the_gate() {
        let (state, token) = state_with_user().await;
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("gate should admit a live session");
        assert_eq!(user.email, "beck@downtown.example");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _) = state_with_user().await;
        let mut parts = parts_with_auth(None);
        let (status, _) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn revoked_session_is_rejected() {
        let (state, token) = state_with_user().await;
        state.auth.logout(&token);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let (status, message) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "You must be logged in to do this");
    }
}
