//! Outgoing email: AWS SES in production, a tracing-only sink everywhere else.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as SesClient;
use tracing::info;

use crate::config::{EmailConfig, EmailProvider};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid email message: {0}")]
    Message(String),
    #[error("AWS SES error: {0}")]
    AwsSes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

pub async fn from_config(cfg: &EmailConfig) -> std::sync::Arc<dyn Mailer> {
    match cfg.provider {
        EmailProvider::Ses => std::sync::Arc::new(SesMailer::new(cfg).await),
        EmailProvider::Log => std::sync::Arc::new(LogMailer),
    }
}

pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub async fn new(cfg: &EmailConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()));
        if let Some(endpoint) = &cfg.endpoint {
            info!(%endpoint, "using custom SES endpoint");
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;
        Self {
            client: SesClient::new(&shared),
            from: cfg.from.clone(),
        }
    }

    fn build_message(message: &EmailMessage) -> Result<Message, EmailError> {
        let subject = Content::builder()
            .data(&message.subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Message(format!("subject: {e}")))?;
        let text = Content::builder()
            .data(&message.body_text)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Message(format!("body: {e}")))?;
        Ok(Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build())
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let ses_message = Self::build_message(&message)?;
        let out = self
            .client
            .send_email()
            .source(&self.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .message(ses_message)
            .send()
            .await
            .map_err(|e| EmailError::AwsSes(e.to_string()))?;
        info!(to = %message.to, message_id = %out.message_id(), "email sent via SES");
        Ok(())
    }
}

/// Writes the email to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(to = %message.to, subject = %message.subject, "email (log provider)");
        Ok(())
    }
}
