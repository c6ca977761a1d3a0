// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate.

pub mod mail_provider;
pub mod password_provider;
pub mod permission_provider;
pub mod token_provider;
pub mod user_provider;

pub use mail_provider::{LogMailer, MailError, Mailer};
pub use password_provider::PasswordProvider;
pub use permission_provider::PermissionProvider;
pub use token_provider::TokenProvider;
pub use user_provider::{NewUser, UserProvider};
