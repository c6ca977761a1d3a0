mod bootstrap_settings;
mod database;
mod env_provider;
mod errors;
mod logging;
mod secret_config;
mod secret_manager;

pub use bootstrap_settings::{BootstrapSettings, DEFAULT_DATABASE_URL, DEFAULT_TOKEN_MAX_AGE_SECONDS};
pub use database::{begin_transaction, commit_transaction, init_database, migrate_database};
pub use env_provider::{EnvironmentProvider, SystemEnvironment};
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use errors::{ConfigError, SecretError};
pub use logging::{init_logging, init_logging_with, LoggingConfig, LoggingError};
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::SecretManager;
