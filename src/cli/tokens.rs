use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::types::internal::token::{TokenPayload, TokenPurpose};

/// Print a freshly signed token for `user_id`
pub fn issue_token(
    app_data: &AppData,
    purpose: &str,
    user_id: i32,
    new_email: Option<&str>,
) -> Result<(), InternalError> {
    let purpose: TokenPurpose = purpose.parse()?;

    let payload = match (purpose, new_email) {
        (TokenPurpose::ChangeEmail, Some(email)) => TokenPayload::with_new_email(user_id, email),
        (TokenPurpose::ChangeEmail, None) => {
            return Err(InternalError::parse("token payload", "change-email requires --new-email"));
        }
        _ => TokenPayload::for_subject(user_id),
    };

    let token = app_data.token_provider.issue(purpose, &payload)?;
    println!("{}", token);
    Ok(())
}

/// Verify a token and report the outcome
///
/// A rejected token is reported, not returned as an error; only
/// infrastructure failures make the command fail.
pub async fn check_token(
    app_data: &AppData,
    purpose: &str,
    user_id: i32,
    token: &str,
) -> Result<(), InternalError> {
    let purpose: TokenPurpose = purpose.parse()?;
    let max_age = app_data.token_provider.default_max_age_seconds();

    match app_data
        .token_provider
        .verify(&app_data.db, token, purpose, user_id, max_age)
        .await
    {
        Ok(payload) => {
            match payload.new_email {
                Some(email) => println!("✅ valid {} token for user {} ({})", purpose, user_id, email),
                None => println!("✅ valid {} token for user {}", purpose, user_id),
            }
            Ok(())
        }
        Err(e) => match e.token_rejection() {
            Some(rejection) => {
                println!("❌ rejected: {}", rejection.reason());
                Ok(())
            }
            None => Err(e),
        },
    }
}
