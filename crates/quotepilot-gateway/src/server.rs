//! HTTP server implementation using Axum.

use axum::Router;
use axum::routing::{get, post};
use quotepilot_channels::{ResendEmail, TwilioSms};
use quotepilot_core::config::QuotePilotConfig;
use quotepilot_providers::{Composer, GeminiComposer, TemplateComposer};
use quotepilot_recovery::RecoveryRunner;
use quotepilot_store::Store;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ratelimit::{RATE_LIMIT_MAX, RATE_LIMIT_WINDOW, RateLimiter};

/// Shared state for the gateway server.
pub struct AppState {
    pub config: QuotePilotConfig,
    pub store: Arc<Store>,
    pub runner: Arc<RecoveryRunner>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(super::routes::health_check))
        .route(
            "/api/v1/recovery/trigger",
            post(super::routes::trigger_recovery),
        )
        .route("/api/v1/credits/grant", post(super::routes::grant_credits))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Restrict CORS origins in production via env var
            // Example: QUOTEPILOT_CORS_ORIGINS=https://app.quotepilot.dev
            if let Ok(origins_str) = std::env::var("QUOTEPILOT_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Wire the production providers into a runner.
fn build_runner(config: &QuotePilotConfig, store: Arc<Store>) -> Arc<RecoveryRunner> {
    let composer: Arc<dyn Composer> = if config.gemini.api_key.trim().is_empty() {
        tracing::info!("Gemini key not set, follow-ups use the template composer");
        Arc::new(TemplateComposer)
    } else {
        Arc::new(GeminiComposer::new(&config.gemini))
    };
    Arc::new(RecoveryRunner::new(
        store,
        composer,
        Arc::new(TwilioSms::new(&config.twilio)),
        Arc::new(ResendEmail::new(&config.resend)),
        config.recovery.lookback_hours as i64,
    ))
}

/// Start the HTTP server.
pub async fn start(config: &QuotePilotConfig) -> anyhow::Result<()> {
    let store = Arc::new(Store::open(&config.db_path())?);
    tracing::info!("Store opened at {}", config.db_path().display());

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        runner: build_runner(config, store),
        rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW)),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
