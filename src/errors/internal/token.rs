use thiserror::Error;

use crate::types::internal::token::TokenPurpose;

/// Expected reasons an account token is rejected.
///
/// All of these are recoverable: the caller rejects the request and tells
/// the user why. Anything unexpected surfaces as another `InternalError`
/// variant instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid or the token is malformed")]
    InvalidSignature,

    /// A negative age means the token claims to be issued in the future
    #[error("{}", expiry_message(.age_seconds, .max_age_seconds))]
    Expired {
        age_seconds: i64,
        max_age_seconds: u64,
    },

    #[error("Token was issued for {actual}, expected {expected}")]
    PurposeMismatch {
        expected: TokenPurpose,
        actual: TokenPurpose,
    },

    #[error("Token belongs to a different user")]
    SubjectMismatch,

    #[error("Token payload is malformed: {reason}")]
    MalformedPayload { reason: &'static str },

    #[error("Email address is already in use: {email}")]
    EmailTaken { email: String },
}

impl TokenError {
    /// Short stable label for logs
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired { .. } => "expired",
            TokenError::PurposeMismatch { .. } => "purpose_mismatch",
            TokenError::SubjectMismatch => "subject_mismatch",
            TokenError::MalformedPayload { .. } => "malformed_payload",
            TokenError::EmailTaken { .. } => "email_taken",
        }
    }
}

fn expiry_message(age_seconds: &i64, max_age_seconds: &u64) -> String {
    if *age_seconds < 0 {
        format!("Token expired: issued {}s in the future", -age_seconds)
    } else {
        format!("Token expired: age {}s exceeds {}s", age_seconds, max_age_seconds)
    }
}
