//! Domain types for the recovery subsystem, plus the defensive
//! coercion helpers applied to data synced from the upstream CRM
//! (numbers may arrive as strings, relations as object-or-array).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hard cap on the estimate-id field accepted from callers.
pub const ESTIMATE_ID_MAX_LEN: usize = 128;

/// Outcome chosen for a single candidate within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    SentSms,
    SentEmail,
    SkippedNoContact,
}

/// Per-candidate result reported back to the caller. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    pub estimate_id: String,
    pub estimate_number: String,
    pub action: RecoveryAction,
    pub message_preview: String,
}

/// Validated trigger payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryPayload {
    pub estimate_id: Option<String>,
    pub dry_run: bool,
}

impl RecoveryPayload {
    /// Normalize an untrusted JSON body. `null` means "run everything";
    /// any other non-object shape, or a present-but-invalid
    /// `estimateId`, is rejected. `dryRun` is only honored as a JSON
    /// `true`.
    pub fn from_value(input: &Value) -> Option<Self> {
        if input.is_null() {
            return Some(Self::default());
        }
        let obj = input.as_object()?;

        let estimate_id = match obj.get("estimateId") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(normalize_estimate_id(raw)?),
        };
        let dry_run = obj.get("dryRun") == Some(&Value::Bool(true));

        Some(Self {
            estimate_id,
            dry_run,
        })
    }
}

/// Accepts `^[A-Za-z0-9:_-]{1,128}$`, trimmed.
pub fn normalize_estimate_id(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    if trimmed.is_empty() || trimmed.len() > ESTIMATE_ID_MAX_LEN {
        return None;
    }
    let ok = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-'));
    ok.then(|| trimmed.to_string())
}

/// Estimate row as read back from the store for candidate selection.
/// The follow-up columns are owned by this subsystem; everything else
/// is synced from the estimate/quote subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEstimate {
    pub id: String,
    pub user_id: String,
    pub estimate_number: Option<String>,
    pub total_amount: Option<f64>,
    pub sent_at: Option<String>,
    pub created_at: Option<String>,
    pub first_followup_queued_at: Option<String>,
    pub first_followed_up_at: Option<String>,
    pub last_followed_up_at: Option<String>,
    /// Denormalized client record: object or one-element array.
    pub client: Value,
    /// Denormalized business profile record: object or one-element array.
    pub profile: Value,
}

/// Contact data resolved for one candidate. Invalid or missing values
/// are empty strings, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateContact {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub business_name: String,
}

/// String field from untrusted JSON: trimmed and capped, or empty.
pub fn trimmed_json_str(value: Option<&Value>, max_len: usize) -> String {
    let Some(s) = value.and_then(Value::as_str) else {
        return String::new();
    };
    s.trim().chars().take(max_len).collect()
}

/// Numeric field from untrusted JSON: accepts numbers and numeric
/// strings, rejects everything else (including NaN/inf).
pub fn finite_json_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp string into UTC, or None.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_null_body_runs_everything() {
        let payload = RecoveryPayload::from_value(&Value::Null).unwrap();
        assert_eq!(payload, RecoveryPayload::default());
        assert!(!payload.dry_run);
    }

    #[test]
    fn test_payload_rejects_non_object() {
        assert!(RecoveryPayload::from_value(&json!("nope")).is_none());
        assert!(RecoveryPayload::from_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_payload_rejects_bad_estimate_id() {
        assert!(RecoveryPayload::from_value(&json!({"estimateId": "has space"})).is_none());
        assert!(RecoveryPayload::from_value(&json!({"estimateId": ""})).is_none());
        assert!(RecoveryPayload::from_value(&json!({"estimateId": "x".repeat(129)})).is_none());
    }

    #[test]
    fn test_payload_accepts_valid_id_and_dry_run() {
        let payload =
            RecoveryPayload::from_value(&json!({"estimateId": " est:1_a-b ", "dryRun": true}))
                .unwrap();
        assert_eq!(payload.estimate_id.as_deref(), Some("est:1_a-b"));
        assert!(payload.dry_run);
    }

    #[test]
    fn test_dry_run_must_be_literal_true() {
        let payload = RecoveryPayload::from_value(&json!({"dryRun": "true"})).unwrap();
        assert!(!payload.dry_run);
        let payload = RecoveryPayload::from_value(&json!({"dryRun": 1})).unwrap();
        assert!(!payload.dry_run);
    }

    #[test]
    fn test_finite_json_number_coercion() {
        assert_eq!(finite_json_number(Some(&json!(250.5))), Some(250.5));
        assert_eq!(finite_json_number(Some(&json!("42"))), Some(42.0));
        assert_eq!(finite_json_number(Some(&json!("oops"))), None);
        assert_eq!(finite_json_number(Some(&json!(true))), None);
        assert_eq!(finite_json_number(None), None);
    }

    #[test]
    fn test_action_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RecoveryAction::SentSms).unwrap(),
            "\"sent_sms\""
        );
        assert_eq!(
            serde_json::to_string(&RecoveryAction::SkippedNoContact).unwrap(),
            "\"skipped_no_contact\""
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp(Some("2026-08-20T10:00:00Z")).is_some());
        assert!(parse_timestamp(Some("not a date")).is_none());
        assert!(parse_timestamp(Some("")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
