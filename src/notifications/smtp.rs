use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use super::{EmailError, Mailer, OutgoingEmail};
use crate::config::EmailConfig;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// STARTTLS relay to `host`.
    pub fn new(host: &str, config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    fn build(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(
                reply_to
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(reply_to.clone()))?,
            );
        }

        Ok(builder.body(email.body.clone())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build(&email)?;
        self.transport.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new("smtp.example.com", &EmailConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn builds_plain_text_message_with_reply_to() {
        let message = mailer()
            .build(&OutgoingEmail {
                to: "owner@shop.test".into(),
                subject: "RB New Custom Order - #CUST-000001".into(),
                body: "hello".into(),
                reply_to: Some("customer@example.com".into()),
            })
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Reply-To: customer@example.com"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[tokio::test]
    async fn rejects_invalid_recipient() {
        let err = mailer()
            .build(&OutgoingEmail {
                to: "not an address".into(),
                subject: "x".into(),
                body: String::new(),
                reply_to: None,
            })
            .unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }
}
