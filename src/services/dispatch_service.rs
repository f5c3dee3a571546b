use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::{
    errors::DeliveryError,
    models::domain::{DeliveryTarget, DispatchOutcome, GenerationResult, TaskKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Submits the message and returns the provider's HTTP status.
    /// Transport failures are errors; any received status is returned as-is.
    async fn send(&self, message: &EmailMessage) -> Result<u16, DeliveryError>;
}

/// SendGrid v3 mail API.
pub struct SendGridMailer {
    http: reqwest::Client,
    api_base: String,
    api_key: SecretString,
}

impl SendGridMailer {
    pub fn new(api_base: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<u16, DeliveryError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": message.from },
            "subject": message.subject,
            "content": [{ "type": "text/plain", "value": message.body }],
        });

        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.api_base.trim_end_matches('/')))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}

/// Delivers a generated result to its requested destination.
pub struct DispatchService {
    mailer: Option<Arc<dyn Mailer>>,
    sender: String,
}

impl DispatchService {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, sender: impl Into<String>) -> Self {
        Self {
            mailer,
            sender: sender.into(),
        }
    }

    /// Never fails: delivery problems come back as
    /// [`DispatchOutcome::DeliveryFailed`] and the result stays usable.
    pub async fn dispatch(
        &self,
        result: &GenerationResult,
        target: &DeliveryTarget,
        task: TaskKind,
        subject: &str,
    ) -> DispatchOutcome {
        match target {
            DeliveryTarget::None => DispatchOutcome::Displayed(result.as_str().to_string()),
            DeliveryTarget::ChatReplyHandle => DispatchOutcome::ChatReply(chat_reply(task, result)),
            DeliveryTarget::EmailAddress(recipient) => {
                match self.send_email(recipient, subject, result).await {
                    Ok(status) => {
                        log::info!("Emailed {} result to {} ({})", task, recipient, status);
                        DispatchOutcome::Emailed {
                            recipient: recipient.clone(),
                            status,
                        }
                    }
                    Err(error) => {
                        log::error!("Could not email {} result to {}: {}", task, recipient, error);
                        DispatchOutcome::DeliveryFailed {
                            recipient: recipient.clone(),
                            error,
                        }
                    }
                }
            }
        }
    }

    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        result: &GenerationResult,
    ) -> Result<u16, DeliveryError> {
        let mailer = self.mailer.as_ref().ok_or(DeliveryError::NotConfigured)?;

        let message = EmailMessage {
            from: self.sender.clone(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: result.as_str().to_string(),
        };

        let status = mailer.send(&message).await?;
        if status >= 400 {
            return Err(DeliveryError::Rejected { status });
        }
        Ok(status)
    }
}

/// Header line for the task, a blank line, then the result.
pub fn chat_reply(task: TaskKind, result: &GenerationResult) -> String {
    format!("{}\n\n{}", task.reply_header(), result)
}
