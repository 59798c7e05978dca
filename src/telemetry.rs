use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
};
use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Installs the global subscriber. `RUST_LOG` wins over the settings-derived
/// filter; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_log_filter()));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

pub(crate) fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        status = tracing::field::Empty,
    )
}

pub(crate) fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, latency_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%status, latency_ms, "request rejected");
    } else {
        tracing::info!(%status, latency_ms, "request served");
    }
}
