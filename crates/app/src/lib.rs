//! Parish application composition root
//!
//! Composes all domain routers into a single application and owns the
//! process-wide pieces: the token validator, tracing setup, CORS and the
//! per-IP rate limit.

pub mod rate_limit;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::get,
    Json, Router,
};
use parish_auth::{AuthBackend, AuthConfig, TokenValidator};
use parish_common::config::LogFormat;
use parish_common::Config;
use parish_community::{CommunityRepositories, CommunityService, CommunityState};
use parish_prayers::{PrayerService, PrayerWindow, PrayersRepositories, PrayersState};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::rate_limit::IpRateLimiter;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the main application router with all routes and middleware
pub fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let auth_config = AuthConfig::from(config);
    let validator = TokenValidator::new(&auth_config)
        .map_err(|e| anyhow::anyhow!("Failed to build token validator: {}", e))?;
    let auth = AuthBackend::new(pool.clone(), Arc::new(validator));

    let prayers_state = PrayersState {
        service: PrayerService::new(
            PrayersRepositories::new(pool.clone()),
            PrayerWindow::new(config.prayed_window_hours, config.prayed_window_max_hours),
        ),
        auth: auth.clone(),
    };

    let community_state = CommunityState {
        service: CommunityService::new(CommunityRepositories::new(pool)),
        auth,
    };

    let api = Router::new()
        .merge(parish_prayers::routes().with_state(prayers_state))
        .merge(parish_community::routes().with_state(community_state));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors_layer(&config.cors_allowed_origins))
                .layer(middleware::from_fn_with_state(
                    IpRateLimiter::new(config.rate_limit_requests, config.rate_limit_window),
                    rate_limit::limit_by_ip,
                ))
                .into_inner(),
        );

    Ok(app)
}

/// CORS for the configured origins; `*` allows any origin, an empty list
/// allows none
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Install the global tracing subscriber from `RUST_LOG` / `LOG_FORMAT`
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init(),
    }
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
