// CLI module for administrative operations against the identity database

pub mod migrate;
pub mod register;
pub mod tokens;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Identity CLI: roles, registrations and account tokens
#[derive(Parser)]
#[command(name = "identity")]
#[command(about = "Role, registration and account token administration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create or reset the default roles
    SeedRoles,

    /// Register a visitor by username, as the index form does
    Register {
        username: String,
    },

    /// Issue an account token (confirm-account, reset-password, change-email)
    IssueToken {
        purpose: String,
        user_id: i32,
        /// Pending address, required for change-email
        #[arg(long)]
        new_email: Option<String>,
    },

    /// Verify an account token against a user id
    CheckToken {
        purpose: String,
        user_id: i32,
        token: String,
    },
}

/// Route the parsed command to its handler
pub async fn execute_command(
    cli: Cli,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => migrate::run_migrations(&app_data).await?,
        Commands::SeedRoles => migrate::seed_roles(&app_data).await?,
        Commands::Register { username } => register::register(app_data, &username).await?,
        Commands::IssueToken {
            purpose,
            user_id,
            new_email,
        } => tokens::issue_token(&app_data, &purpose, user_id, new_email.as_deref())?,
        Commands::CheckToken {
            purpose,
            user_id,
            token,
        } => tokens::check_token(&app_data, &purpose, user_id, &token).await?,
    }

    Ok(())
}
