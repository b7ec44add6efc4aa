//! Resend transactional email channel.
//!
//! All interpolated user-controlled strings are HTML-escaped before
//! they reach the template.

use async_trait::async_trait;
use quotepilot_core::config::ResendConfig;
use quotepilot_core::error::{QuotePilotError, Result};
use serde_json::{Value, json};

use crate::{EmailGateway, EmailInput, escape_html};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

pub struct ResendEmail {
    config: ResendConfig,
    client: reqwest::Client,
}

impl ResendEmail {
    pub fn new(config: &ResendConfig) -> Self {
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }
}

fn build_subject(estimate_number: &str) -> String {
    format!("Checking in on estimate {estimate_number}")
}

fn build_html(input: &EmailInput) -> String {
    let safe_client_name = escape_html(&input.client_name);
    let safe_message = escape_html(&input.message).replace('\n', "<br />");
    let safe_business_name = escape_html(&input.business_name);

    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 560px; margin: 0 auto; color: #111827;\">\
         <p>Hi {safe_client_name},</p>\
         <p>{safe_message}</p>\
         <p>Thanks,<br />{safe_business_name}</p>\
         </div>"
    )
}

#[async_trait]
impl EmailGateway for ResendEmail {
    async fn send_followup_email(&self, input: &EmailInput) -> Result<String> {
        if self.config.api_key.trim().is_empty() {
            return Err(QuotePilotError::Channel("Resend is not configured".into()));
        }

        let body = json!({
            "from": self.config.from,
            "to": [input.to_email],
            "subject": build_subject(&input.estimate_number),
            "html": build_html(input),
        });

        let resp = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.config.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| QuotePilotError::Http(format!("Resend connection failed: {e}")))?;

        let status = resp.status();
        let payload: Value = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            let provider_message = payload["message"]
                .as_str()
                .filter(|m| !m.trim().is_empty())
                .map(|m| m.trim().to_string())
                .unwrap_or_else(|| format!("Resend request failed ({status})"));
            return Err(QuotePilotError::Channel(provider_message));
        }

        let id: String = payload["id"]
            .as_str()
            .unwrap_or("")
            .trim()
            .chars()
            .take(120)
            .collect();
        tracing::info!("Follow-up email dispatched to {}", input.to_email);
        Ok(if id.is_empty() {
            "resend-message".into()
        } else {
            id
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EmailInput {
        EmailInput {
            to_email: "kim@example.com".into(),
            client_name: "Kim <script>".into(),
            business_name: "A&B HVAC".into(),
            message: "Line one\nLine two".into(),
            estimate_number: "SQ-1002".into(),
        }
    }

    #[test]
    fn test_subject_carries_estimate_number() {
        assert_eq!(build_subject("SQ-1002"), "Checking in on estimate SQ-1002");
    }

    #[test]
    fn test_html_escapes_user_strings() {
        let html = build_html(&input());
        assert!(html.contains("Hi Kim &lt;script&gt;,"));
        assert!(html.contains("A&amp;B HVAC"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_html_converts_newlines() {
        let html = build_html(&input());
        assert!(html.contains("Line one<br />Line two"));
    }

    #[tokio::test]
    async fn test_unconfigured_resend_is_hard_error() {
        let email = ResendEmail::new(&ResendConfig {
            api_key: String::new(),
            from: "QuotePilot <onboarding@resend.dev>".into(),
        });
        let err = email.send_followup_email(&input()).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
