use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub session_ttl_minutes: i64,
    pub reset_link_base: String,
}

impl AuthConfig {
    /// Reads configuration from the environment, with defaults suitable for
    /// local development. The reset-token lifetime is fixed policy, not
    /// configuration; see `reset::ticket::RESET_TOKEN_TTL`.
    pub fn from_env() -> Self {
        Self {
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            reset_link_base: std::env::var("RESET_LINK_BASE")
                .unwrap_or_else(|_| "http://localhost:8080/account/reset".into()),
        }
    }

    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::minutes(self.session_ttl_minutes)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 60,
            reset_link_base: "http://localhost:8080/account/reset".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_ttl_is_an_hour() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl(), time::Duration::minutes(60));
    }
}
