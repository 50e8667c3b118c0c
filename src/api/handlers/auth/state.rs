//! Auth state and configuration.

use secrecy::SecretString;
use std::sync::Arc;

use super::{storage::UserStore, token::TokenKeys};
use crate::api::email::EmailSender;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    token_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    pub(super) fn reset_token_ttl_seconds(&self) -> i64 {
        self.reset_token_ttl_seconds
    }
}

pub struct AuthState {
    config: AuthConfig,
    keys: TokenKeys,
    store: UserStore,
    email_sender: Arc<dyn EmailSender>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        jwt_secret: &SecretString,
        store: UserStore,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        let keys = TokenKeys::new(jwt_secret, config.token_ttl_seconds());
        Self {
            config,
            keys,
            store,
            email_sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    #[must_use]
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub(super) fn email_sender(&self) -> &dyn EmailSender {
        self.email_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("http://localhost:5173".to_string());

        assert_eq!(config.frontend_base_url(), "http://localhost:5173");
        assert_eq!(config.token_ttl_seconds(), DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(
            config.reset_token_ttl_seconds(),
            DEFAULT_RESET_TOKEN_TTL_SECONDS
        );

        let config = config
            .with_token_ttl_seconds(120)
            .with_reset_token_ttl_seconds(30);

        assert_eq!(config.token_ttl_seconds(), 120);
        assert_eq!(config.reset_token_ttl_seconds(), 30);
    }

    #[test]
    fn auth_state_uses_config_ttl_for_tokens() {
        let config = AuthConfig::new("http://localhost:5173".to_string()).with_token_ttl_seconds(90);
        let state = AuthState::new(
            config,
            &SecretString::from("secret".to_string()),
            UserStore::memory(),
            Arc::new(LogEmailSender),
        );
        assert_eq!(state.keys().ttl_seconds(), 90);
        assert!(matches!(state.store(), UserStore::Memory(_)));
    }
}
