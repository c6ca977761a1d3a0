use thiserror::Error;

pub mod token;
pub mod user;

pub use token::TokenError;
pub use user::UserError;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure failures (database, crypto, parsing) are shared by every
/// layer; domain failures (tokens, users) come from one provider each.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("Database error: {operation} failed: {source}")]
    Database {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    /// Opening or committing the transaction around a multi-step write
    /// (role seeding, user creation, email change)
    #[error("Transaction {stage} failed: {source}")]
    Transaction {
        stage: &'static str,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    User(#[from] UserError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Transaction { stage: "begin", source }
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Transaction { stage: "commit", source }
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// The token failure, when this error is an expected token rejection
    pub fn token_rejection(&self) -> Option<&TokenError> {
        match self {
            InternalError::Token(err) => Some(err),
            _ => None,
        }
    }
}
