//! Outgoing email.
//!
//! Request handlers never wait on delivery: [`Notifier::dispatch`] hands the
//! message to a detached task and logs failures there.

pub mod messages;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::CustomOrder;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Mailer used when SMTP is not configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "smtp disabled, email logged only"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    owner_address: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, owner_address: String) -> Self {
        Self {
            mailer,
            owner_address,
        }
    }

    /// Send and wait for the outcome.
    pub async fn deliver(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.mailer.send(email).await
    }

    /// Send on a detached task. Failures are logged, never returned.
    pub fn dispatch(&self, email: OutgoingEmail) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let to = email.to.clone();
            let subject = email.subject.clone();
            if let Err(err) = mailer.send(email).await {
                tracing::warn!(error = %err, %to, %subject, "email delivery failed");
            }
        })
    }

    /// Owner alert plus, when the customer left an address, their confirmation.
    pub fn custom_order_received(&self, order: &CustomOrder, has_images: bool) -> Vec<JoinHandle<()>> {
        let mut sent = vec![self.dispatch(messages::owner_new_custom_order(
            &self.owner_address,
            order,
            has_images,
        ))];
        if let Some(email) = messages::customer_confirmation(order, has_images) {
            sent.push(self.dispatch(email));
        }
        sent
    }

    pub fn custom_order_status_changed(
        &self,
        order: &CustomOrder,
        has_images: bool,
    ) -> Option<JoinHandle<()>> {
        messages::status_update(order, has_images).map(|email| self.dispatch(email))
    }

    pub fn newsletter_welcome(&self, address: &str) -> JoinHandle<()> {
        self.dispatch(messages::newsletter_welcome(address))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{ContactMethod, CustomOrderStatus};
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::InvalidAddress(email.to));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    pub fn order(email: Option<&str>, status: CustomOrderStatus) -> CustomOrder {
        CustomOrder {
            id: Uuid::new_v4(),
            reference_id: "CUST-A1B2C3".into(),
            customer_name: "Marina".into(),
            description: Some("A 3ft octopus in teal".into()),
            contact_method: ContactMethod::Instagram,
            contact_info: Some("@marina.rugs".into()),
            email: email.map(str::to_string),
            status,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn new_custom_order_alerts_owner_and_customer() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(mailer.clone(), "owner@shop.test".into());

        let handles = notifier.custom_order_received(
            &order(Some("marina@example.com"), CustomOrderStatus::Pending),
            false,
        );
        for handle in handles {
            handle.await.unwrap();
        }

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().any(|m| m.to == "owner@shop.test"
            && m.reply_to.as_deref() == Some("marina@example.com")));
        assert!(sent.iter().any(|m| m.to == "marina@example.com"));
    }

    #[tokio::test]
    async fn order_without_email_only_alerts_owner() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(mailer.clone(), "owner@shop.test".into());

        let handles = notifier.custom_order_received(&order(None, CustomOrderStatus::Pending), true);
        assert_eq!(handles.len(), 1);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(mailer.sent.lock().unwrap()[0].to, "owner@shop.test");
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(mailer.clone(), "owner@shop.test".into());

        notifier.newsletter_welcome("a@b.test").await.unwrap();
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert!(notifier.deliver(messages::newsletter_welcome("a@b.test")).await.is_err());
    }
}
