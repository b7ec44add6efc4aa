//! Outbound dispatch channels.
//!
//! Exactly one channel is used per candidate. Both providers are
//! modeled behind async traits so the orchestrator can be exercised
//! with mocks; a dispatch error from either is a hard failure for the
//! run (the claim is released by the caller).

pub mod email;
pub mod sms;

pub use email::ResendEmail;
pub use sms::TwilioSms;

use async_trait::async_trait;
use quotepilot_core::error::Result;

/// Outcome of a provider SMS send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsDispatch {
    pub message_id: String,
    pub status: String,
}

/// Everything the email channel needs for one follow-up.
#[derive(Debug, Clone)]
pub struct EmailInput {
    pub to_email: String,
    pub client_name: String,
    pub business_name: String,
    pub message: String,
    pub estimate_number: String,
}

/// SMS provider contract: a success must carry a provider message id.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, to_phone: &str, body: &str) -> Result<SmsDispatch>;
}

/// Transactional-email provider contract: returns a provider id.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send_followup_email(&self, input: &EmailInput) -> Result<String>;
}

/// Escape user-controlled strings before HTML interpolation.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
