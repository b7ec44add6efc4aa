//! Follow-up message composition.
//!
//! The composer is infallible by contract: the AI path is an upgrade,
//! never a dependency. Any provider problem (missing key, HTTP
//! failure, empty text) drops to the deterministic template so a
//! dispatch is never blocked by AI unavailability.

pub mod gemini;

pub use gemini::GeminiComposer;

use async_trait::async_trait;

/// Everything the composer knows about one candidate.
#[derive(Debug, Clone)]
pub struct ComposeInput {
    pub client_name: String,
    pub estimate_number: String,
    pub total_amount: Option<f64>,
    pub business_name: String,
}

/// Produces a short, personalized follow-up message.
#[async_trait]
pub trait Composer: Send + Sync {
    /// Always returns a non-empty message.
    async fn compose(&self, input: &ComposeInput) -> String;
}

/// Deterministic template used whenever the AI path is unavailable.
pub fn fallback_message(input: &ComposeInput) -> String {
    let total_text = match input.total_amount {
        Some(total) if total.is_finite() => {
            format!(" regarding your ${:.2} quote", total.max(0.0))
        }
        _ => String::new(),
    };

    format!(
        "Hi {}, just checking in on estimate {}{} from {}. Let me know if you have any questions or want to lock in a schedule.",
        input.client_name, input.estimate_number, total_text, input.business_name
    )
}

/// Template-only composer (no AI configured, and test double).
pub struct TemplateComposer;

#[async_trait]
impl Composer for TemplateComposer {
    async fn compose(&self, input: &ComposeInput) -> String {
        fallback_message(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ComposeInput {
        ComposeInput {
            client_name: "Alex".into(),
            estimate_number: "SQ-100".into(),
            total_amount: Some(250.5),
            business_name: "Acme".into(),
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(
            fallback_message(&input()),
            "Hi Alex, just checking in on estimate SQ-100 regarding your $250.50 quote from Acme. Let me know if you have any questions or want to lock in a schedule."
        );
    }

    #[test]
    fn test_fallback_omits_unknown_total() {
        let mut input = input();
        input.total_amount = None;
        assert_eq!(
            fallback_message(&input),
            "Hi Alex, just checking in on estimate SQ-100 from Acme. Let me know if you have any questions or want to lock in a schedule."
        );
    }

    #[test]
    fn test_fallback_floors_negative_total() {
        let mut input = input();
        input.total_amount = Some(-3.0);
        assert!(fallback_message(&input).contains("$0.00"));
    }

    #[tokio::test]
    async fn test_template_composer_never_empty() {
        let message = TemplateComposer.compose(&input()).await;
        assert!(!message.is_empty());
        assert!(message.contains("SQ-100"));
    }
}
