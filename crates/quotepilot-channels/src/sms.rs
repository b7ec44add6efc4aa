//! Twilio SMS channel.

use async_trait::async_trait;
use quotepilot_core::config::TwilioConfig;
use quotepilot_core::error::{QuotePilotError, Result};
use serde_json::Value;

use crate::{SmsDispatch, SmsGateway};

pub struct TwilioSms {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioSms {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }
}

fn trimmed(value: &Value, key: &str, max_len: usize) -> String {
    value[key]
        .as_str()
        .unwrap_or("")
        .trim()
        .chars()
        .take(max_len)
        .collect()
}

#[async_trait]
impl SmsGateway for TwilioSms {
    async fn send_sms(&self, to_phone: &str, body: &str) -> Result<SmsDispatch> {
        if !self.config.is_configured() {
            return Err(QuotePilotError::Channel("Twilio is not configured".into()));
        }

        let endpoint = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let form = [
            ("To", to_phone),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let resp = self
            .client
            .post(&endpoint)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| QuotePilotError::Http(format!("Twilio connection failed: {e}")))?;

        let status = resp.status();
        let payload: Value = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            let provider_message = trimmed(&payload, "message", 200);
            let message = if provider_message.is_empty() {
                format!("Twilio request failed ({status})")
            } else {
                provider_message
            };
            return Err(QuotePilotError::Channel(message));
        }

        let message_id = trimmed(&payload, "sid", 80);
        if message_id.is_empty() {
            return Err(QuotePilotError::Channel(
                "Twilio response is missing message id".into(),
            ));
        }

        let delivery_status = trimmed(&payload, "status", 40);
        tracing::info!("SMS dispatched via Twilio: {message_id}");
        Ok(SmsDispatch {
            message_id,
            status: if delivery_status.is_empty() {
                "queued".into()
            } else {
                delivery_status
            },
        })
    }
}
