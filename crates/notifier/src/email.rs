//! Email channel through an EmailJS-compatible HTTP relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{AlertMessage, ChannelKind, Notifier, NotifyError, Recipient};

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Relay account used to send alert emails.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EmailSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    #[serde(default)]
    pub private_key: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    subject: String,
    message_html: String,
    app_name: &'static str,
}

#[derive(Clone, Debug)]
pub struct EmailNotifier {
    client: Client,
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(client: Client, settings: EmailSettings) -> Self {
        Self { client, settings }
    }

    fn request<'a>(&'a self, to: &'a str, message: &'a AlertMessage) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            access_token: self.settings.private_key.as_deref(),
            template_params: TemplateParams {
                to_email: to,
                to_name: &message.username,
                subject: message.subject(),
                message_html: message.email_html(),
                app_name: "Budgetify",
            },
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn notify(
        &self,
        recipient: &Recipient,
        message: &AlertMessage,
    ) -> Result<(), NotifyError> {
        let Recipient::Email(to) = recipient else {
            return Err(NotifyError::WrongRecipient(recipient.clone()));
        };

        let resp = self
            .client
            .post(&self.settings.endpoint)
            .json(&self.request(to, message))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            _ => "email relay error".to_string(),
        };
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
