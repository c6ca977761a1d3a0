use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::internal::InternalError;

/// The action a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    ConfirmAccount,
    ResetPassword,
    ChangeEmail,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::ConfirmAccount => "confirm-account",
            TokenPurpose::ResetPassword => "reset-password",
            TokenPurpose::ChangeEmail => "change-email",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm-account" => Ok(TokenPurpose::ConfirmAccount),
            "reset-password" => Ok(TokenPurpose::ResetPassword),
            "change-email" => Ok(TokenPurpose::ChangeEmail),
            other => Err(InternalError::parse("token purpose", other)),
        }
    }
}

/// What a token is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub subject_id: i32,
    /// Pending address, only meaningful for `ChangeEmail`
    pub new_email: Option<String>,
}

impl TokenPayload {
    pub fn for_subject(subject_id: i32) -> Self {
        Self {
            subject_id,
            new_email: None,
        }
    }

    pub fn with_new_email(subject_id: i32, new_email: impl Into<String>) -> Self {
        Self {
            subject_id,
            new_email: Some(new_email.into()),
        }
    }
}

/// Signed claims carried inside an account token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub purpose: TokenPurpose,

    /// Subject (user id)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl TokenClaims {
    pub fn new(purpose: TokenPurpose, payload: &TokenPayload, iat: i64) -> Self {
        Self {
            purpose,
            sub: payload.subject_id.to_string(),
            new_email: payload.new_email.clone(),
            iat,
        }
    }

    /// `None` when `sub` is not a user id
    pub fn subject_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_parses_its_own_name() {
        for purpose in [
            TokenPurpose::ConfirmAccount,
            TokenPurpose::ResetPassword,
            TokenPurpose::ChangeEmail,
        ] {
            assert_eq!(purpose.as_str().parse::<TokenPurpose>().unwrap(), purpose);
        }
    }

    #[test]
    fn test_unknown_purpose_is_parse_error() {
        let err = "delete-account".parse::<TokenPurpose>().unwrap_err();
        assert!(err.to_string().contains("token purpose"));
    }

    #[test]
    fn test_claims_omit_absent_email() {
        let claims = TokenClaims::new(
            TokenPurpose::ConfirmAccount,
            &TokenPayload::for_subject(7),
            1_700_000_000,
        );

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["purpose"], "confirm-account");
        assert_eq!(json["sub"], "7");
        assert!(json.get("new_email").is_none());
    }

    #[test]
    fn test_non_numeric_subject() {
        let mut claims = TokenClaims::new(
            TokenPurpose::ResetPassword,
            &TokenPayload::for_subject(7),
            1_700_000_000,
        );
        assert_eq!(claims.subject_id(), Some(7));

        claims.sub = "seven".to_string();
        assert_eq!(claims.subject_id(), None);
    }
}
