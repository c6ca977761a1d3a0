use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to send '{subject}' to {to}: {message}")]
pub struct MailError {
    pub to: String,
    pub subject: String,
    pub message: String,
}

/// Outbound mail boundary
///
/// Rendering and delivery happen outside this crate; implementations hand
/// the template name and context to whatever transport is in use.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: Value,
    ) -> Result<(), MailError>;
}

/// Mailer that only records messages in the log
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: Value,
    ) -> Result<(), MailError> {
        tracing::info!(to, subject, template, %context, "Outbound email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_log_mailer_accepts_message() {
        let mailer = LogMailer;
        let result = mailer
            .send_email("admin@example.com", "New User", "mail/new_user", json!({ "user": "john" }))
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_mail_error_message() {
        let err = MailError {
            to: "admin@example.com".to_string(),
            subject: "New User".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to send 'New User' to admin@example.com: connection refused"
        );
    }
}
