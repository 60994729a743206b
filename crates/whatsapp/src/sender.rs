use std::time::Duration;

use async_trait::async_trait;
use pricewire_core::config::WhatsAppConfig;
use pricewire_core::{DeliveryError, DeliveryReceipt, MessageSender};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Serialize)]
struct TextMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends plain-text replies through `POST /{phone-number-id}/messages`.
#[derive(Clone)]
pub struct GraphApiSender {
    http: Client,
    messages_url: String,
    access_token: SecretString,
}

impl GraphApiSender {
    pub fn new(
        api_base_url: &str,
        phone_number_id: &str,
        access_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let messages_url =
            format!("{}/{}/messages", api_base_url.trim_end_matches('/'), phone_number_id.trim());
        Ok(Self { http, messages_url, access_token })
    }

    pub fn from_config(config: &WhatsAppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.api_base_url,
            &config.phone_number_id,
            config.access_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl MessageSender for GraphApiSender {
    async fn send_text(
        &self,
        recipient: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let request = TextMessageRequest {
            messaging_product: "whatsapp",
            to: recipient,
            text: TextBody { body },
        };

        let response = self
            .http
            .post(&self.messages_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        let status = response.status();
        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(error) => {
                debug!(
                    event_name = "whatsapp.send.body_unreadable",
                    status = status.as_u16(),
                    error = %error.without_url(),
                    "graph api response body could not be read"
                );
                String::new()
            }
        };
        debug!(
            event_name = "whatsapp.send.response",
            status = status.as_u16(),
            body = %raw,
            "graph api responded"
        );

        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: raw.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let message_id = serde_json::from_str::<SendMessageResponse>(&raw)
            .unwrap_or_default()
            .messages
            .into_iter()
            .next()
            .map(|message| message.id);

        Ok(DeliveryReceipt { status: status.as_u16(), message_id })
    }
}
