use std::sync::Arc;

use clap::Parser;

use identity_core::AppData;
use identity_core::cli::{Cli, execute_command};
use identity_core::config::{BootstrapSettings, SecretManager, init_logging};
use identity_core::providers::LogMailer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();

    let settings = BootstrapSettings::from_env()?;
    tracing::debug!(?settings, "Loaded bootstrap settings");

    let secret_manager = Arc::new(SecretManager::init()?);

    let app_data = Arc::new(AppData::init(settings, secret_manager, Arc::new(LogMailer)).await?);

    execute_command(cli, app_data).await
}
