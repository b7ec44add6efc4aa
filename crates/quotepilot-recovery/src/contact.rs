//! Contact resolution for a candidate estimate.
//!
//! The client and business-profile relations arrive in whatever shape
//! the upstream sync produced: a bare object, a one-element array, or
//! nothing at all. Resolution never fails; invalid values degrade to
//! empty strings and names fall back to neutral placeholders.

use quotepilot_core::types::{CandidateContact, CandidateEstimate, trimmed_json_str};
use serde_json::{Map, Value};

const NAME_MAX_LEN: usize = 120;
const EMAIL_MAX_LEN: usize = 320;
const PHONE_MAX_LEN: usize = 32;

/// First object out of an object-or-array relation column.
pub fn extract_relation_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.first().and_then(Value::as_object),
        _ => None,
    }
}

/// Strict E.164: `+`, a leading 1-9, then 7 to 14 more digits.
pub fn is_e164(phone: &str) -> bool {
    let Some(rest) = phone.strip_prefix('+') else {
        return false;
    };
    let digits: Vec<char> = rest.chars().collect();
    (8..=15).contains(&digits.len())
        && digits[0] != '0'
        && digits.iter().all(|c| c.is_ascii_digit())
}

/// Minimal shape check: one `@`, no whitespace, a dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot >= 1 && dot < domain.len() - 1,
        None => false,
    }
}

fn normalize_phone(relation: Option<&Map<String, Value>>) -> String {
    let raw = trimmed_json_str(relation.and_then(|m| m.get("phone")), PHONE_MAX_LEN);
    if is_e164(&raw) { raw } else { String::new() }
}

fn normalize_email(relation: Option<&Map<String, Value>>) -> String {
    let raw = trimmed_json_str(relation.and_then(|m| m.get("email")), EMAIL_MAX_LEN).to_lowercase();
    if is_plausible_email(&raw) {
        raw
    } else {
        String::new()
    }
}

fn name_or(relation: Option<&Map<String, Value>>, key: &str, fallback: &str) -> String {
    let name = trimmed_json_str(relation.and_then(|m| m.get(key)), NAME_MAX_LEN);
    if name.is_empty() { fallback.into() } else { name }
}

/// Resolve contact and display names for one candidate.
pub fn resolve_contact(estimate: &CandidateEstimate) -> CandidateContact {
    let client = extract_relation_object(&estimate.client);
    let profile = extract_relation_object(&estimate.profile);

    CandidateContact {
        client_name: name_or(client, "name", "there"),
        client_email: normalize_email(client),
        client_phone: normalize_phone(client),
        business_name: name_or(profile, "business_name", "your contractor"),
    }
}
