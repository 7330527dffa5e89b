//! HTTP frontend for the relay.
//!
//! A single GET route implementing the caller contract: `q` carries the
//! domain/IP, `json` (or an `X-Requested-With: XMLHttpRequest` header)
//! selects the JSON payload, and every dynamic response carries no-cache
//! headers because WHOIS data changes and a cached record is misleading.
//! Missing or empty `q` answers 200 with a short usage banner; the real
//! presentation surface lives elsewhere.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::errors::WhoisRelayError;
use crate::lookup::{LookupClient, LookupOptions};
use crate::output::{JsonFormatter, ReportFormatter, TextFormatter};
use crate::ratelimit::{MemoryRateStore, RateLimiter};
use crate::transport::SilentEnv;
use crate::validate::check_query;

/// Headers forbidding any caching of a dynamic response.
const NO_CACHE_HEADERS: [(&str, &str); 3] = [
    ("cache-control", "no-store, no-cache, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

const USAGE_BANNER: &str = "whoisrelay: pass ?q=<domain-or-ip> to perform a WHOIS lookup\n";

/// Shared state for the lookup service
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<LookupClient>,
    pub limiter: Arc<RateLimiter<MemoryRateStore>>,
}

impl AppState {
    pub fn new(client: LookupClient, rate_interval: Duration) -> Self {
        AppState {
            client: Arc::new(client),
            limiter: Arc::new(RateLimiter::new(MemoryRateStore::new(), rate_interval)),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(lookup_handler)).with_state(state)
}

/// Bind and run the service until ctrl-c.
pub async fn serve(bind: &str, state: AppState) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind lookup service to {}: {}", bind, e))?;

    log::info!("whoisrelay listening on http://{}/", bind);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Lookup service error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install ctrl-c handler: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}

/// The one dynamic endpoint: validate, throttle, look up, render.
pub async fn lookup_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let json_mode = wants_json(&params, &headers);
    let formatter: Box<dyn ReportFormatter> = if json_mode {
        Box::new(JsonFormatter::new(false))
    } else {
        Box::new(TextFormatter)
    };

    let query = params.get("q").map(String::as_str).unwrap_or("").trim();
    if query.is_empty() {
        // Presentation mode: no lookup, just the banner.
        return respond(StatusCode::OK, TextFormatter.mime_type(), USAGE_BANNER.to_string());
    }

    let client_id = peer.ip().to_string();

    // Validation comes before the limiter: a malformed query is answered 400
    // without consuming the client's rate budget.
    if let Err(err) = check_query(query) {
        log::info!("400 {} q={:?} [{}]: {}", client_id, query, err.category(), err);
        return error_response(StatusCode::BAD_REQUEST, &err, formatter.as_ref());
    }

    if !state.limiter.allow(&client_id).await {
        let err = WhoisRelayError::rate_limited(&client_id);
        log::info!("429 {} q={:?} [{}]", client_id, query, err.category());
        return error_response(StatusCode::TOO_MANY_REQUESTS, &err, formatter.as_ref());
    }

    match state
        .client
        .lookup(query, &LookupOptions::default(), &SilentEnv)
        .await
    {
        Ok(report) => {
            if report.upstream_unreachable {
                log::warn!("upstream {} unreachable for q={:?}", report.server, query);
            }
            log::info!(
                "200 {} q={:?} server={} referral_followed={} {}ms",
                client_id,
                query,
                report.server,
                report.referral_followed,
                report.duration_ms
            );
            match formatter.format_report(&report) {
                Ok(body) => respond(StatusCode::OK, formatter.mime_type(), body),
                Err(e) => {
                    log::error!("formatting failed: {}", e);
                    respond(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "text/plain; charset=utf-8",
                        "internal error\n".to_string(),
                    )
                }
            }
        }
        Err(err) => {
            log::info!("400 {} q={:?} [{}]: {}", client_id, query, err.category(), err);
            error_response(StatusCode::BAD_REQUEST, &err, formatter.as_ref())
        }
    }
}

/// JSON mode: explicit `json` parameter or the conventional AJAX header.
fn wants_json(params: &HashMap<String, String>, headers: &HeaderMap) -> bool {
    if params.contains_key("json") {
        return true;
    }
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

fn respond(status: StatusCode, mime: &'static str, body: String) -> Response {
    (
        status,
        [("content-type", mime)],
        NO_CACHE_HEADERS,
        body,
    )
        .into_response()
}

fn error_response(
    status: StatusCode,
    err: &WhoisRelayError,
    formatter: &dyn ReportFormatter,
) -> Response {
    let body = formatter
        .format_error(err)
        .unwrap_or_else(|_| "internal error\n".to_string());
    respond(status, formatter.mime_type(), body)
}
