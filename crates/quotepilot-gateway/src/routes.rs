//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use quotepilot_core::error::QuotePilotError;
use quotepilot_core::types::RecoveryPayload;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::auth::{self, Caller};
use crate::ratelimit::client_ip;
use crate::server::AppState;

fn error_status(err: &QuotePilotError) -> StatusCode {
    match err {
        QuotePilotError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
        QuotePilotError::Entitlement(_) => StatusCode::PAYMENT_REQUIRED,
        QuotePilotError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"ok": false, "error": message})))
}

/// Liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "quotepilot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/v1/recovery/trigger`
pub async fn trigger_recovery(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if !state.rate_limiter.check(&client_ip(&headers)) {
        return json_error(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }

    let caller = match auth::authorize(&state.store, &state.config.recovery.cron_secret, &headers)
    {
        Ok(caller) => caller,
        Err(err) => return json_error(error_status(&err), &err.to_string()),
    };

    // An empty body means "run everything", same as `{}`.
    let raw: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid JSON body"),
        }
    };
    let Some(payload) = RecoveryPayload::from_value(&raw) else {
        return json_error(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let scope = match &caller {
        Caller::Cron => None,
        Caller::User(user_id) => Some(user_id.as_str()),
    };

    match state.runner.run(&payload, scope).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "processedCount": report.processed_count,
                "results": report.results,
            })),
        ),
        Err(err) => json_error(error_status(&err), &err.to_string()),
    }
}

/// `POST /api/v1/credits/grant` — scheduler-only ledger funding.
pub async fn grant_credits(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    match auth::authorize(&state.store, &state.config.recovery.cron_secret, &headers) {
        Ok(Caller::Cron) => {}
        Ok(Caller::User(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Scheduler secret required");
        }
        Err(err) => return json_error(error_status(&err), &err.to_string()),
    }

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid JSON body"),
    };
    let user_id = raw["userId"].as_str().unwrap_or("").trim();
    let credits = raw["credits"].as_i64().unwrap_or(0);
    if user_id.is_empty() || credits <= 0 {
        return json_error(
            StatusCode::BAD_REQUEST,
            "userId and a positive credits amount are required",
        );
    }
    let reason = raw["reason"]
        .as_str()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("credit_grant");

    let ref_id = format!("grant-{}", uuid::Uuid::new_v4());
    if let Err(err) = state
        .store
        .append_ledger_entry(user_id, credits, reason, &ref_id)
    {
        return json_error(error_status(&err), &err.to_string());
    }
    let balance = match state.store.sms_balance(user_id) {
        Ok(balance) => balance,
        Err(err) => return json_error(error_status(&err), &err.to_string()),
    };
    tracing::info!("Granted {credits} SMS credit(s) to {user_id}");

    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "userId": user_id,
            "granted": credits,
            "balance": balance,
        })),
    )
}
