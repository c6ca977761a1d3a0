use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{init_database, BootstrapSettings, SecretManager};
use crate::errors::InternalError;
use crate::providers::{Mailer, PasswordProvider, PermissionProvider, TokenProvider, UserProvider};
use crate::stores::{RoleStore, UserStore};

/// Centralized application data
///
/// Stores and providers are created once and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ├─ db (DatabaseConnection)
///   ├─ settings / secret_manager
///   ├─ role_store, user_store
///   ├─ permission_provider, password_provider, token_provider, user_provider
///   └─ mailer
///   ↓ wrapped in Arc<AppData>
///   ├─ AccountCoordinator::new(app_data)
///   └─ RegistrationCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: BootstrapSettings,
    pub secret_manager: Arc<SecretManager>,
    pub role_store: Arc<RoleStore>,
    pub user_store: Arc<UserStore>,
    pub permission_provider: Arc<PermissionProvider>,
    pub password_provider: Arc<PasswordProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub user_provider: Arc<UserProvider>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppData {
    /// Connect to the configured database and build all stores and
    /// providers. Migrations are not run here.
    pub async fn init(
        settings: BootstrapSettings,
        secret_manager: Arc<SecretManager>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");
        let db = init_database(&settings).await?;
        let app_data = Self::from_connection(db, settings, secret_manager, mailer);
        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }

    pub fn from_connection(
        db: DatabaseConnection,
        settings: BootstrapSettings,
        secret_manager: Arc<SecretManager>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let role_store = Arc::new(RoleStore::new());
        let user_store = Arc::new(UserStore::new());

        let permission_provider = Arc::new(PermissionProvider::new(role_store.clone()));
        let password_provider = Arc::new(PasswordProvider::new(secret_manager.clone()));
        let token_provider = Arc::new(TokenProvider::new(
            secret_manager.clone(),
            user_store.clone(),
            settings.token_max_age_seconds(),
        ));
        let user_provider = Arc::new(UserProvider::new(
            user_store.clone(),
            role_store.clone(),
            password_provider.clone(),
            settings.admin_email().map(str::to_string),
        ));

        Self {
            db,
            settings,
            secret_manager,
            role_store,
            user_store,
            permission_provider,
            password_provider,
            token_provider,
            user_provider,
            mailer,
        }
    }
}
