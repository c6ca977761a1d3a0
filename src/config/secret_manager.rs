use std::fmt;

use crate::config::errors::SecretError;
use crate::config::{EnvironmentProvider, SecretConfig, SystemEnvironment};

/// Centralized manager for application secrets
///
/// Loaded once at startup. Rotating `SECRET_KEY` invalidates every
/// outstanding account token.
pub struct SecretManager {
    secret_key: String,
    password_pepper: String,
}

impl SecretManager {
    /// Load and validate all secrets from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or too short
    pub fn init() -> Result<Self, SecretError> {
        Self::init_with(&SystemEnvironment)
    }

    /// Load and validate all secrets from the given provider
    pub fn init_with(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        let secret_key = Self::load_secret(env, &Self::secret_key_config())?;
        let password_pepper = Self::load_secret(env, &Self::pepper_config())?;

        Ok(Self {
            secret_key,
            password_pepper,
        })
    }

    /// Build directly from known values (tests, embedding)
    pub fn from_values(secret_key: impl Into<String>, password_pepper: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            password_pepper: password_pepper.into(),
        }
    }

    fn secret_key_config() -> SecretConfig {
        SecretConfig::env("SECRET_KEY").required(true).min_length(16)
    }

    fn pepper_config() -> SecretConfig {
        SecretConfig::env("PASSWORD_PEPPER").required(true).min_length(16)
    }

    /// Key used to sign account tokens
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Argon2 secret parameter for password hashing
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    pub(crate) fn load_secret(
        env: &dyn EnvironmentProvider,
        config: &SecretConfig,
    ) -> Result<String, SecretError> {
        let name = config.secret_type.name();

        let value = match env.get_var(name) {
            Some(v) => v,
            None if !config.required => return Ok(String::new()),
            None => return Err(SecretError::missing(name)),
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::invalid_length(name, min_len, value.len()));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("secret_key", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 2 }}")
    }
}
