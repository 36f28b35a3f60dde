use std::sync::Arc;

use axum::{Router, body::Body, extract::DefaultBodyLimit, http::Request, middleware};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, info_span};

use crate::middleware::proxy_headers::{ClientInfo, TrustedProxies, proxy_headers};
use crate::state::AppState;

/// Mix requests are small JSON documents; media is fetched by URL.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_app(state: AppState) -> Router {
    let trusted = Arc::new(TrustedProxies::parse(&state.config.forwarded_allow_ips));

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            let client = request.extensions().get::<ClientInfo>();
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id,
                client_addr = ?client.and_then(|c| c.addr),
                scheme = client.map(|c| c.scheme.as_str()).unwrap_or("http")
            )
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Outermost layer last: request id, then proxy headers, then the access log.
    crate::routes::configure_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace)
        .layer(middleware::from_fn_with_state(trusted, proxy_headers))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
