//! Payment webhook configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum shared secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 16;

/// Payment webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Secret shared with the payment provider for signing webhooks
    pub shared_secret: SecretString,
}

impl WebhookConfig {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: SecretString::new(shared_secret.into()),
        }
    }

    /// Validate webhook configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.shared_secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ValidationError::MissingRequired("WEBHOOK__SHARED_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::WeakWebhookSecret(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_secret() {
        let config = WebhookConfig::new("  ");
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("WEBHOOK__SHARED_SECRET"))
        );
    }

    #[test]
    fn test_short_secret_allowed_outside_production() {
        let config = WebhookConfig::new("dev");
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::WeakWebhookSecret(16))
        );
    }

    #[test]
    fn test_long_secret_valid_in_production() {
        let config = WebhookConfig::new("0123456789abcdef0123");
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = WebhookConfig::new("super-secret-value");
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
