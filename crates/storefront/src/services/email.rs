//! Email service for password reset mail.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and text templates.

use std::time::Duration;

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::EmailConfig;

/// Subject line for the temporary password email.
pub const TEMPORARY_PASSWORD_SUBJECT: &str = "[Aoeyaeng Clothing] Your Temporary Password";

#[derive(Template)]
#[template(path = "email/temporary_password.html")]
struct TemporaryPasswordHtml<'a> {
    password: &'a str,
    login_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/temporary_password.txt")]
struct TemporaryPasswordText<'a> {
    password: &'a str,
    login_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The relay didn't finish the exchange in time.
    #[error("SMTP exchange timed out after {0:?}")]
    Timeout(Duration),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    login_url: String,
    timeout: Duration,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// No connection is made until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::InvalidAddress` if the sender address doesn't parse,
    /// or `EmailError::Smtp` if the relay's TLS parameters can't be built.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(config.smtp_timeout))
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self {
            mailer,
            from,
            login_url: format!("{}/login", base_url.trim_end_matches('/')),
            timeout: config.smtp_timeout,
        })
    }

    /// Send a member their temporary password.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render, SMTP rejects the
    /// message, or the exchange outlasts the configured timeout.
    pub async fn send_temporary_password(
        &self,
        to: &str,
        password: &SecretString,
    ) -> Result<(), EmailError> {
        let message = self.temporary_password_message(to, password)?;
        tokio::time::timeout(self.timeout, self.mailer.send(message))
            .await
            .map_err(|_| EmailError::Timeout(self.timeout))??;

        tracing::info!(to = %to, subject = TEMPORARY_PASSWORD_SUBJECT, "Email sent successfully");
        Ok(())
    }

    /// Build the multipart temporary password message.
    fn temporary_password_message(
        &self,
        to: &str,
        password: &SecretString,
    ) -> Result<Message, EmailError> {
        let password = password.expose_secret();
        let login_url = self.login_url.as_str();
        let html = TemporaryPasswordHtml {
            password,
            login_url,
        }
        .render()?;
        let text = TemporaryPasswordText {
            password,
            login_url,
        }
        .render()?;

        let to: Mailbox = to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(to.to_string()))?;

        Ok(Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(TEMPORARY_PASSWORD_SUBJECT)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    fn service() -> EmailService {
        let config = test_config();
        EmailService::new(&config.email, &config.base_url).unwrap()
    }

    #[tokio::test]
    async fn rejects_bad_sender() {
        let mut config = test_config();
        config.email.from_address = "not an address".to_string();
        assert!(matches!(
            EmailService::new(&config.email, &config.base_url),
            Err(EmailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn temporary_password_message_contains_both_parts() {
        let message = service()
            .temporary_password_message("member@example.com", &SecretString::from("k3x9q0ab"))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: [Aoeyaeng Clothing] Your Temporary Password"));
        assert!(raw.contains("To: member@example.com"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("k3x9q0ab"));
        assert!(raw.contains("http://localhost:3000/login"));
    }

    #[tokio::test]
    async fn rejects_bad_recipient() {
        let result =
            service().temporary_password_message("nobody", &SecretString::from("k3x9q0ab"));
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn silent_relay_gives_up_after_timeout() {
        // Accepts the TCP connection but never sends a greeting
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

        let mut config = test_config();
        config.email.smtp_host = "127.0.0.1".to_string();
        config.email.smtp_port = listener.local_addr().unwrap().port();
        config.email.smtp_timeout = Duration::from_millis(200);
        let service = EmailService::new(&config.email, &config.base_url).unwrap();

        let started = std::time::Instant::now();
        let result = service
            .send_temporary_password("member@example.com", &SecretString::from("k3x9q0ab"))
            .await;

        assert!(matches!(
            result,
            Err(EmailError::Timeout(_) | EmailError::Smtp(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
