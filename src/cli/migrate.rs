use crate::app_data::AppData;
use crate::config::migrate_database;
use crate::errors::InternalError;

/// Run all pending migrations on the configured database
pub async fn run_migrations(app_data: &AppData) -> Result<(), InternalError> {
    tracing::info!("Running database migrations...");
    migrate_database(&app_data.db).await?;
    println!("✅ Migrations applied");
    Ok(())
}

/// Seed User, Moderator and Administrator, resetting drifted masks
pub async fn seed_roles(app_data: &AppData) -> Result<(), InternalError> {
    let roles = app_data
        .permission_provider
        .seed_default_roles(&app_data.db)
        .await?;

    for role in roles {
        println!("{:<15} {:>3}", role.name, role.permissions);
    }
    Ok(())
}
