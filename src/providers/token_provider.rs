use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::ConnectionTrait;

use crate::config::SecretManager;
use crate::errors::internal::TokenError;
use crate::errors::InternalError;
use crate::stores::UserStore;
use crate::types::internal::token::{TokenClaims, TokenPayload, TokenPurpose};

/// Issues and verifies signed, time-bounded account tokens
///
/// A token is an HS256 JWT over `{ purpose, sub, new_email?, iat }`. Issuance
/// only stamps the creation time; every verification supplies its own
/// maximum age, so one format serves purposes with different freshness
/// needs. Tokens are not single-use: a valid token can be replayed until it
/// expires.
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    user_store: Arc<UserStore>,
    default_max_age_seconds: u64,
}

impl TokenProvider {
    pub fn new(
        secret_manager: Arc<SecretManager>,
        user_store: Arc<UserStore>,
        default_max_age_seconds: u64,
    ) -> Self {
        Self {
            secret_manager,
            user_store,
            default_max_age_seconds,
        }
    }

    pub fn default_max_age_seconds(&self) -> u64 {
        self.default_max_age_seconds
    }

    /// Sign `payload` for `purpose`, stamped with the current time
    pub fn issue(&self, purpose: TokenPurpose, payload: &TokenPayload) -> Result<String, InternalError> {
        self.issue_at(purpose, payload, Utc::now())
    }

    pub fn issue_at(
        &self,
        purpose: TokenPurpose,
        payload: &TokenPayload,
        issued_at: DateTime<Utc>,
    ) -> Result<String, InternalError> {
        let claims = TokenClaims::new(purpose, payload, issued_at.timestamp());

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.secret_key().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("token_issue", format!("Failed to sign token: {}", e)))?;

        tracing::debug!(purpose = %purpose, subject = payload.subject_id, "Issued account token");

        Ok(token)
    }

    pub fn confirmation_token(&self, user_id: i32) -> Result<String, InternalError> {
        self.issue(TokenPurpose::ConfirmAccount, &TokenPayload::for_subject(user_id))
    }

    pub fn reset_token(&self, user_id: i32) -> Result<String, InternalError> {
        self.issue(TokenPurpose::ResetPassword, &TokenPayload::for_subject(user_id))
    }

    pub fn change_email_token(&self, user_id: i32, new_email: &str) -> Result<String, InternalError> {
        self.issue(
            TokenPurpose::ChangeEmail,
            &TokenPayload::with_new_email(user_id, new_email),
        )
    }

    /// Check signature, age, purpose and subject of a token
    ///
    /// Pure: no database access. For change-email tokens the presence of the
    /// new address is checked here, its availability only in `verify`.
    pub fn decode(
        &self,
        token: &str,
        purpose: TokenPurpose,
        expected_subject: i32,
        max_age_seconds: u64,
    ) -> Result<TokenPayload, InternalError> {
        self.decode_at(token, purpose, expected_subject, max_age_seconds, Utc::now())
    }

    pub fn decode_at(
        &self,
        token: &str,
        purpose: TokenPurpose,
        expected_subject: i32,
        max_age_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, InternalError> {
        let claims = self.decode_claims(token, max_age_seconds, now)?;
        self.into_payload(claims, purpose, expected_subject)
    }

    /// Decode a token whose subject is not known in advance
    ///
    /// Used by the password-reset flow, where nobody is signed in and the
    /// token alone names the account.
    pub fn decode_subject_at(
        &self,
        token: &str,
        purpose: TokenPurpose,
        max_age_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, InternalError> {
        let claims = self.decode_claims(token, max_age_seconds, now)?;
        let subject_id = claims.subject_id().ok_or_else(|| {
            self.reject(TokenError::MalformedPayload {
                reason: "subject is not a user id",
            })
        })?;

        self.into_payload(claims, purpose, subject_id)
    }

    /// Full verification, including the email-availability check for
    /// change-email tokens
    pub async fn verify(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
        purpose: TokenPurpose,
        expected_subject: i32,
        max_age_seconds: u64,
    ) -> Result<TokenPayload, InternalError> {
        self.verify_at(conn, token, purpose, expected_subject, max_age_seconds, Utc::now())
            .await
    }

    pub async fn verify_at(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
        purpose: TokenPurpose,
        expected_subject: i32,
        max_age_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, InternalError> {
        if purpose == TokenPurpose::ChangeEmail {
            let new_email = self
                .verify_change_email_at(conn, token, expected_subject, max_age_seconds, now)
                .await?;
            return Ok(TokenPayload::with_new_email(expected_subject, new_email));
        }

        self.decode_at(token, purpose, expected_subject, max_age_seconds, now)
    }

    /// Verify a change-email token and return the address it carries
    pub async fn verify_change_email(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
        expected_subject: i32,
        max_age_seconds: u64,
    ) -> Result<String, InternalError> {
        self.verify_change_email_at(conn, token, expected_subject, max_age_seconds, Utc::now())
            .await
    }

    pub async fn verify_change_email_at(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
        expected_subject: i32,
        max_age_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<String, InternalError> {
        let claims = self.decode_claims(token, max_age_seconds, now)?;
        let subject_id = self.check_claims(&claims, TokenPurpose::ChangeEmail, expected_subject)?;
        let new_email = self.pending_email(&claims)?;

        match self.user_store.find_by_email(conn, new_email).await? {
            Some(owner) if owner.id != subject_id => Err(self.reject(TokenError::EmailTaken {
                email: new_email.to_string(),
            })),
            _ => Ok(new_email.to_string()),
        }
    }

    fn decode_claims(
        &self,
        token: &str,
        max_age_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, InternalError> {
        // Age is checked against `iat` below, not through an `exp` claim
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.secret_key().as_bytes()),
            &validation,
        )
        .map_err(|e| self.map_decode_error(e))?
        .claims;

        // Issued in the future counts as expired too
        let age_seconds = now.timestamp() - claims.iat;
        let too_old = u64::try_from(age_seconds).map_or(true, |age| age > max_age_seconds);
        if too_old {
            return Err(self.reject(TokenError::Expired {
                age_seconds,
                max_age_seconds,
            }));
        }

        Ok(claims)
    }

    /// Purpose and subject checks; returns the subject id
    fn check_claims(
        &self,
        claims: &TokenClaims,
        purpose: TokenPurpose,
        expected_subject: i32,
    ) -> Result<i32, InternalError> {
        if claims.purpose != purpose {
            return Err(self.reject(TokenError::PurposeMismatch {
                expected: purpose,
                actual: claims.purpose,
            }));
        }

        let subject_id = claims.subject_id().ok_or_else(|| {
            self.reject(TokenError::MalformedPayload {
                reason: "subject is not a user id",
            })
        })?;

        if subject_id != expected_subject {
            return Err(self.reject(TokenError::SubjectMismatch));
        }

        Ok(subject_id)
    }

    fn into_payload(
        &self,
        claims: TokenClaims,
        purpose: TokenPurpose,
        expected_subject: i32,
    ) -> Result<TokenPayload, InternalError> {
        let subject_id = self.check_claims(&claims, purpose, expected_subject)?;

        let new_email = match purpose {
            TokenPurpose::ChangeEmail => Some(self.pending_email(&claims)?.to_string()),
            TokenPurpose::ConfirmAccount | TokenPurpose::ResetPassword => None,
        };

        Ok(TokenPayload {
            subject_id,
            new_email,
        })
    }

    /// The address a change-email token carries; blank counts as missing
    fn pending_email<'a>(&self, claims: &'a TokenClaims) -> Result<&'a str, InternalError> {
        match claims.new_email.as_deref() {
            Some(email) if !email.trim().is_empty() => Ok(email),
            _ => Err(self.reject(TokenError::MalformedPayload {
                reason: "missing new email",
            })),
        }
    }

    fn map_decode_error(&self, err: jsonwebtoken::errors::Error) -> InternalError {
        match Self::classify_decode_error(&err) {
            Some(rejection) => self.reject(rejection),
            None => InternalError::crypto("token_decode", err.to_string()),
        }
    }

    /// Map library failures that mean "this is not a token we signed".
    /// Everything else is unexpected and must not pass as a bad token.
    fn classify_decode_error(err: &jsonwebtoken::errors::Error) -> Option<TokenError> {
        match err.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Some(TokenError::InvalidSignature),
            _ => None,
        }
    }

    fn reject(&self, err: TokenError) -> InternalError {
        tracing::warn!(reason = err.reason(), "Rejected account token");
        InternalError::Token(err)
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("default_max_age_seconds", &self.default_max_age_seconds)
            .finish()
    }
}

impl fmt::Display for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenProvider {{ default_max_age: {}s }}",
            self.default_max_age_seconds
        )
    }
}
