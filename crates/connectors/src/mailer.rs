//! Outbound notification email via SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use soclink_core::credentials::Credentials;

use crate::error::{AdapterError, AdapterResult};
use crate::traits::{MailMessage, MailerSystem};

const SYSTEM: &str = "SMTP";

/// Default SMTP submission port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP mailer built from the `SMTP` connector record.
///
/// The record's URL takes the form `smtp://host:port`; the username/password
/// credential variant supplies the login.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Build a mailer. Returns `None` when the URL cannot be parsed or the
    /// credential variant is not username/password -- the factory treats that
    /// as "mailer unavailable".
    pub fn new(url: &str, credentials: &Credentials, from_address: &str) -> Option<Self> {
        let (host, port) = parse_smtp_url(url)?;

        let Credentials::UsernamePassword { username, password } = credentials else {
            return None;
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .ok()?
            .port(port)
            .credentials(SmtpCredentials::new(username.clone(), password.clone()))
            .build();

        Some(Self {
            transport,
            from_address: from_address.to_string(),
        })
    }

    /// Probe the SMTP endpoint (EHLO + auth) without sending mail.
    pub async fn test_connection(&self) -> AdapterResult<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| AdapterError::call_failed(SYSTEM, e.to_string()))
    }
}

#[async_trait]
impl MailerSystem for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> AdapterResult<()> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| AdapterError::call_failed(SYSTEM, format!("bad from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AdapterError::call_failed(SYSTEM, format!("bad recipient: {e}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AdapterError::call_failed(SYSTEM, e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AdapterError::call_failed(SYSTEM, e.to_string()))?;
        Ok(())
    }
}

/// Parse `smtp://host:port` (scheme and port optional) into host + port.
fn parse_smtp_url(url: &str) -> Option<(String, u16)> {
    let rest = url.strip_prefix("smtp://").unwrap_or(url);
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }

    match rest.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().ok()?;
            if host.is_empty() {
                return None;
            }
            Some((host.to_string(), port))
        }
        None => Some((rest.to_string(), DEFAULT_SMTP_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_smtp_url_variants() {
        assert_eq!(
            parse_smtp_url("smtp://mail.example.com:2525"),
            Some(("mail.example.com".to_string(), 2525))
        );
        assert_eq!(
            parse_smtp_url("mail.example.com"),
            Some(("mail.example.com".to_string(), DEFAULT_SMTP_PORT))
        );
        assert_eq!(parse_smtp_url("smtp://"), None);
        assert_eq!(parse_smtp_url("smtp://host:notaport"), None);
    }

    #[test]
    fn mailer_requires_username_password_variant() {
        let mailer = SmtpMailer::new(
            "smtp://mail:587",
            &Credentials::ApiKey("k".into()),
            "soclink@example.com",
        );
        assert!(mailer.is_none());
    }
}
