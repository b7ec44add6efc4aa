//! Caller authorization.
//!
//! Two legitimate callers: the scheduler (shared secret, sweeps every
//! user) and an end user (bearer token, scoped to their own estimates,
//! gated on plan tier).

use axum::http::HeaderMap;
use quotepilot_core::error::{QuotePilotError, Result};
use quotepilot_store::Store;

/// Plan tiers allowed to trigger recovery with a user token.
pub const ALLOWED_TIERS: [&str; 2] = ["pro", "team"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Cron,
    User(String),
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn bearer_token<'a>(headers: &'a HeaderMap) -> Option<&'a str> {
    header_value(headers, "authorization")
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Resolve the caller from request headers. The cron secret is checked
/// first so the scheduler never burns a token lookup.
pub fn authorize(store: &Store, cron_secret: &str, headers: &HeaderMap) -> Result<Caller> {
    let bearer = bearer_token(headers);

    let secret = cron_secret.trim();
    if !secret.is_empty()
        && (bearer == Some(secret) || header_value(headers, "x-cron-secret") == Some(secret))
    {
        return Ok(Caller::Cron);
    }

    if let Some(token) = bearer {
        if let Some(user_id) = store.resolve_token(token)? {
            let tier = store.plan_tier(&user_id)?;
            if ALLOWED_TIERS.contains(&tier.as_str()) {
                return Ok(Caller::User(user_id));
            }
            return Err(QuotePilotError::Entitlement(
                "Quote recovery requires a Pro or Team plan".into(),
            ));
        }
    }

    Err(QuotePilotError::AuthFailed(
        "Missing or invalid credentials".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn store_with_user(tier: &str) -> Store {
        let store = Store::open_in_memory().unwrap();
        store.upsert_profile("u1", tier, "Acme").unwrap();
        store.insert_api_token("tok-1", "u1").unwrap();
        store
    }

    #[test]
    fn test_cron_secret_via_bearer_or_header() {
        let store = Store::open_in_memory().unwrap();
        let h = headers(&[("authorization", "Bearer s3cret")]);
        assert_eq!(authorize(&store, "s3cret", &h).unwrap(), Caller::Cron);

        let h = headers(&[("x-cron-secret", "s3cret")]);
        assert_eq!(authorize(&store, "s3cret", &h).unwrap(), Caller::Cron);
    }

    #[test]
    fn test_empty_configured_secret_never_matches() {
        let store = Store::open_in_memory().unwrap();
        let h = headers(&[("x-cron-secret", "")]);
        assert!(matches!(
            authorize(&store, "", &h),
            Err(QuotePilotError::AuthFailed(_))
        ));
    }

    #[test]
    fn test_user_token_with_allowed_tier() {
        let store = store_with_user("pro");
        let h = headers(&[("authorization", "Bearer tok-1")]);
        assert_eq!(
            authorize(&store, "s3cret", &h).unwrap(),
            Caller::User("u1".into())
        );

        let store = store_with_user("team");
        assert_eq!(
            authorize(&store, "s3cret", &h).unwrap(),
            Caller::User("u1".into())
        );
    }

    #[test]
    fn test_free_tier_is_entitlement_error() {
        let store = store_with_user("free");
        let h = headers(&[("authorization", "Bearer tok-1")]);
        assert!(matches!(
            authorize(&store, "s3cret", &h),
            Err(QuotePilotError::Entitlement(_))
        ));
    }

    #[test]
    fn test_unknown_token_is_auth_error() {
        let store = Store::open_in_memory().unwrap();
        let h = headers(&[("authorization", "Bearer nope")]);
        assert!(matches!(
            authorize(&store, "s3cret", &h),
            Err(QuotePilotError::AuthFailed(_))
        ));

        let h = headers(&[]);
        assert!(matches!(
            authorize(&store, "s3cret", &h),
            Err(QuotePilotError::AuthFailed(_))
        ));
    }
}
